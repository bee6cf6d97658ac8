//! Cache storage backends

#[cfg(test)]
use mockall::automock;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::cache::error::CacheError;

const MAX_KEY_LENGTH: usize = 512;

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// An entry with the same key was stored by someone else first
    AlreadyExists,
}

/// Storage for cached directories, addressed by key
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Whether the backend can be reached at all
    async fn is_feature_available(&self) -> bool;

    /// Restores `paths` from `primary_key`, or from the newest entry whose key
    /// starts with one of `restore_keys`. Returns the matched key.
    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>, CacheError>;

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<SaveOutcome, CacheError>;
}

/// Checks whether caching can be used in this environment.
///
/// An unavailable backend on an on-premises server is a configuration error;
/// anywhere else caching is skipped with a warning.
pub async fn is_cache_feature_available(
    backend: &dyn CacheBackend,
    server_url: Option<&str>,
) -> Result<bool, CacheError> {
    if backend.is_feature_available().await {
        return Ok(true);
    }

    if is_ghes(server_url) {
        return Err(CacheError::UnsupportedServer);
    }

    warn!("The runner was not able to contact the cache service. Caching will be skipped");
    Ok(false)
}

/// True when `GITHUB_SERVER_URL` points somewhere other than github.com
pub fn is_ghes(server_url: Option<&str>) -> bool {
    let url = server_url
        .filter(|u| !u.is_empty())
        .unwrap_or("https://github.com");

    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .host_str()
            .is_some_and(|host| !host.eq_ignore_ascii_case("github.com")),
        Err(e) => {
            debug!("Unable to parse server url {}: {}", url, e);
            false
        }
    }
}

/// Stores every key as a directory snapshot below `root`
#[derive(Debug, Clone)]
pub struct LocalCacheBackend {
    root: PathBuf,
}

impl LocalCacheBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl CacheBackend for LocalCacheBackend {
    async fn is_feature_available(&self) -> bool {
        match fs::create_dir_all(&self.root) {
            Ok(()) => true,
            Err(e) => {
                debug!("Cache root {} is unusable: {}", self.root.display(), e);
                false
            }
        }
    }

    async fn restore(
        &self,
        paths: &[PathBuf],
        primary_key: &str,
        restore_keys: &[String],
    ) -> Result<Option<String>, CacheError> {
        validate_key(primary_key)?;
        let root = self.root.clone();
        let paths = paths.to_vec();
        let primary_key = primary_key.to_string();
        let restore_keys = restore_keys.to_vec();

        run_blocking(move || {
            let Some(key) = find_entry(&root, &primary_key, &restore_keys)? else {
                return Ok(None);
            };
            let entry = root.join(&key);
            for (index, path) in paths.iter().enumerate() {
                let stored = entry.join(index.to_string());
                if stored.is_dir() {
                    copy_dir_recursive(&stored, path)?;
                }
            }
            debug!("Restored {} from {}", key, entry.display());
            Ok(Some(key))
        })
        .await
    }

    async fn save(&self, paths: &[PathBuf], key: &str) -> Result<SaveOutcome, CacheError> {
        validate_key(key)?;
        if paths.iter().any(|p| !p.exists()) {
            return Err(CacheError::Backend(
                "Path Validation Error: Path(s) specified in the action for caching do(es) not exist, hence no cache is being saved.".to_string(),
            ));
        }

        let root = self.root.clone();
        let paths = paths.to_vec();
        let key = key.to_string();

        run_blocking(move || {
            let entry = root.join(&key);
            if entry.exists() {
                return Ok(SaveOutcome::AlreadyExists);
            }

            let staging = root.join(format!(".staging-{}-{}", key, std::process::id()));
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }
            let copied = paths
                .iter()
                .enumerate()
                .try_for_each(|(index, path)| {
                    copy_dir_recursive(path, &staging.join(index.to_string()))
                });
            if let Err(e) = copied {
                discard_staging(&staging);
                return Err(e.into());
            }

            match fs::rename(&staging, &entry) {
                Ok(()) => Ok(SaveOutcome::Saved),
                Err(_) if entry.exists() => {
                    discard_staging(&staging);
                    Ok(SaveOutcome::AlreadyExists)
                }
                Err(e) => {
                    discard_staging(&staging);
                    Err(e.into())
                }
            }
        })
        .await
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, CacheError>
where
    F: FnOnce() -> Result<T, CacheError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CacheError::Backend(e.to_string()))?
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::Backend(format!(
            "Key Validation Error: {key} cannot be empty or larger than {MAX_KEY_LENGTH} characters."
        )));
    }
    if key.contains(',') {
        return Err(CacheError::Backend(format!(
            "Key Validation Error: {key} cannot contain commas."
        )));
    }
    if key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(CacheError::Backend(format!(
            "Key Validation Error: {key} is not a valid entry name."
        )));
    }
    Ok(())
}

/// Exact entry first, then for each restore key the newest entry it prefixes
fn find_entry(
    root: &Path,
    primary_key: &str,
    restore_keys: &[String],
) -> Result<Option<String>, CacheError> {
    if root.join(primary_key).is_dir() {
        return Ok(Some(primary_key.to_string()));
    }
    if restore_keys.is_empty() || !root.is_dir() {
        return Ok(None);
    }

    let mut entries: Vec<(String, SystemTime)> = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.file_type()?.is_dir() {
            continue;
        }
        let modified = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((name, modified));
    }

    Ok(restore_keys.iter().find_map(|prefix| {
        entries
            .iter()
            .filter(|(name, _)| name.starts_with(prefix.as_str()))
            .max_by_key(|(_, modified)| *modified)
            .map(|(name, _)| name.clone())
    }))
}

fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_dir_all(staging) {
        debug!("Failed to remove {}: {}", staging.display(), e);
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
