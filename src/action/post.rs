//! Post step: save the NuGet cache

use std::path::Path;

use tracing::debug;

use crate::cache::{
    CacheBackend, CacheError, SaveResult, is_cache_feature_available, save_cache,
};
use crate::process::CommandRunner;
use crate::workflow::Workflow;

/// Saves the cache when caching is enabled and the backend is reachable,
/// `None` otherwise
pub async fn run_post(
    cache: bool,
    server_url: Option<&str>,
    dotnet: &Path,
    runner: &dyn CommandRunner,
    backend: &dyn CacheBackend,
    workflow: &dyn Workflow,
) -> Result<Option<SaveResult>, CacheError> {
    if !cache {
        debug!("Caching is disabled, nothing to save");
        return Ok(None);
    }

    if !is_cache_feature_available(backend, server_url).await? {
        return Ok(None);
    }

    save_cache(dotnet, runner, backend, workflow).await.map(Some)
}
