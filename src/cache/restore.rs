use std::path::PathBuf;

use tracing::{debug, info};

use crate::cache::backend::CacheBackend;
use crate::cache::error::CacheError;
use crate::cache::key::{hash_files, primary_key, resolve_lock_files};
use crate::cache::nuget::nuget_folder_paths;
use crate::config::{outputs, state};
use crate::process::CommandRunner;
use crate::workflow::Workflow;

/// Inputs shared by the restore and save phases
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Root the lock-file patterns are resolved against
    pub workspace: PathBuf,
    /// Platform label embedded in the key (`Linux`, `Windows`, `macOS`)
    pub platform: String,
    /// .NET CLI used to locate the NuGet folders
    pub dotnet: PathBuf,
    pub lock_file_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub primary_key: String,
    pub matched_key: Option<String>,
}

impl RestoreOutcome {
    pub fn cache_hit(&self) -> bool {
        self.matched_key.is_some()
    }
}

/// Restores the NuGet global-packages folder.
///
/// The primary key is persisted before the lookup so the save phase can run
/// even when nothing was restored. A miss is not an error.
pub async fn restore_cache(
    settings: &CacheSettings,
    runner: &dyn CommandRunner,
    backend: &dyn CacheBackend,
    workflow: &dyn Workflow,
) -> Result<RestoreOutcome, CacheError> {
    let lock_files = resolve_lock_files(&settings.workspace, &settings.lock_file_patterns)?;
    let hash = hash_files(&lock_files)?;
    let primary_key = primary_key(&settings.platform, &hash);
    debug!("primary key is {}", primary_key);

    workflow.save_state(state::CACHE_PRIMARY_KEY, &primary_key)?;

    let folders = nuget_folder_paths(runner, &settings.dotnet).await?;
    if folders.global_packages.is_empty() {
        return Err(CacheError::MissingNuGetFolder);
    }
    let cache_path = PathBuf::from(&folders.global_packages);

    let matched_key = backend.restore(&[cache_path], &primary_key, &[]).await?;
    workflow.set_output(outputs::CACHE_HIT, &matched_key.is_some().to_string())?;

    match &matched_key {
        Some(key) => {
            workflow.save_state(state::CACHE_MATCHED_KEY, key)?;
            info!("Cache restored from key: {}", key);
        }
        None => info!("dotnet cache is not found"),
    }

    Ok(RestoreOutcome {
        primary_key,
        matched_key,
    })
}
