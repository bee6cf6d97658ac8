//! Main step: install the requested SDKs, then restore the NuGet cache

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::action::error::SetupError;
use crate::action::global_json::version_from_global_json;
use crate::action::problem_matcher::register_problem_matcher;
use crate::cache::{
    CacheBackend, CacheSettings, RestoreOutcome, is_cache_feature_available, restore_cache,
};
use crate::config::{DEFAULT_LOCK_FILE_PATTERNS, dotnet_executable, outputs};
use crate::install::{InstallSettings, InstalledRelease, install_all, select_output_version};
use crate::process::CommandRunner;
use crate::version::quality::Quality;
use crate::version::release_index::ReleaseIndex;
use crate::workflow::Workflow;

/// Action inputs of the setup step
#[derive(Debug, Clone, Default)]
pub struct SetupInputs {
    /// One expression per entry, blank entries are ignored
    pub versions: Vec<String>,
    pub quality: Option<String>,
    pub global_json_file: Option<PathBuf>,
    pub cache: bool,
    /// Lock-file globs, the defaults apply when empty
    pub cache_dependency_path: Vec<String>,
}

/// Facts about the machine and job the step runs in
#[derive(Debug, Clone)]
pub struct SetupEnvironment {
    pub install: InstallSettings,
    /// Directory relative inputs and the fallback `global.json` resolve against
    pub working_dir: PathBuf,
    /// Root of the lock-file search
    pub workspace: PathBuf,
    /// Platform label used in cache keys
    pub platform_label: String,
    /// `GITHUB_SERVER_URL`
    pub server_url: Option<String>,
    /// Where the problem matcher definition is written
    pub matcher_dir: PathBuf,
}

/// Collaborators doing the actual I/O
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub index: &'a dyn ReleaseIndex,
    pub runner: &'a dyn CommandRunner,
    pub backend: &'a dyn CacheBackend,
    pub workflow: &'a dyn Workflow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub installed: Vec<InstalledRelease>,
    pub dotnet_version: Option<String>,
    /// `None` when caching was disabled or unavailable
    pub cache: Option<RestoreOutcome>,
}

pub async fn run_setup(
    inputs: &SetupInputs,
    env: &SetupEnvironment,
    services: Services<'_>,
) -> Result<SetupReport, SetupError> {
    let mut versions: Vec<String> = inputs
        .versions
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    let quality = Quality::from_input(inputs.quality.as_deref())?;

    let mut from_global_json = false;
    if let Some(file) = inputs.global_json_file.as_ref().filter(|f| !f.as_os_str().is_empty()) {
        let path = env.working_dir.join(file);
        if !path.is_file() {
            return Err(SetupError::GlobalJsonNotFound(file.clone()));
        }
        versions.push(version_from_global_json(&path)?);
        from_global_json = true;
    }

    if versions.is_empty() {
        debug!("No version found, trying to find version from global.json");
        let path = env.working_dir.join("global.json");
        if path.is_file() {
            versions.push(version_from_global_json(&path)?);
            from_global_json = true;
        } else {
            info!(
                "The global.json wasn't found in the root directory. No .NET version will be installed."
            );
        }
    }

    let installed = install_all(
        &versions,
        quality,
        &env.install,
        services.index,
        services.runner,
        services.workflow,
    )
    .await?;

    let dotnet_version = report_version(&installed, from_global_json, services.workflow)?;
    register_problem_matcher(&env.matcher_dir, services.workflow)?;

    let cache = if inputs.cache
        && is_cache_feature_available(services.backend, env.server_url.as_deref()).await?
    {
        let settings = CacheSettings {
            workspace: env.workspace.clone(),
            platform: env.platform_label.clone(),
            dotnet: dotnet_executable(&env.install.install_dir, env.install.platform),
            lock_file_patterns: lock_file_patterns(&inputs.cache_dependency_path),
        };
        Some(restore_cache(&settings, services.runner, services.backend, services.workflow).await?)
    } else {
        None
    };

    Ok(SetupReport {
        installed,
        dotnet_version,
        cache,
    })
}

fn report_version(
    installed: &[InstalledRelease],
    from_global_json: bool,
    workflow: &dyn Workflow,
) -> Result<Option<String>, SetupError> {
    if installed.is_empty() {
        info!("The 'dotnet-version' output will not be set.");
        return Ok(None);
    }

    match select_output_version(installed, from_global_json) {
        Some(version) => {
            workflow.set_output(outputs::DOTNET_VERSION, &version)?;
            Ok(Some(version))
        }
        None => {
            warn!(
                "Failed to output the installed version of .NET. The 'dotnet-version' output will not be set."
            );
            Ok(None)
        }
    }
}

/// Lock-file globs, falling back to the defaults
pub fn lock_file_patterns(inputs: &[String]) -> Vec<String> {
    let patterns: Vec<String> = inputs
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if patterns.is_empty() {
        DEFAULT_LOCK_FILE_PATTERNS.iter().map(|p| p.to_string()).collect()
    } else {
        patterns
    }
}
