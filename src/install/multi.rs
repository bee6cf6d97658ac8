use indexmap::IndexSet;
use tracing::{debug, info};

use crate::install::error::InstallError;
use crate::install::orchestrator::{InstallSettings, InstalledRelease, install};
use crate::process::CommandRunner;
use crate::version::quality::Quality;
use crate::version::release_index::ReleaseIndex;
use crate::version::semver::find_semantic_max;
use crate::workflow::Workflow;

/// Installs every requested expression in order.
///
/// Duplicates and blank entries are dropped, the first failure aborts the
/// remaining installs. PATH and `DOTNET_ROOT` are registered once, after the
/// last install.
pub async fn install_all(
    expressions: &[String],
    quality: Option<Quality>,
    settings: &InstallSettings,
    index: &dyn ReleaseIndex,
    runner: &dyn CommandRunner,
    workflow: &dyn Workflow,
) -> Result<Vec<InstalledRelease>, InstallError> {
    let unique: IndexSet<&str> = expressions
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();

    if unique.is_empty() {
        debug!("No .NET versions requested");
        return Ok(Vec::new());
    }

    let mut releases = Vec::with_capacity(unique.len());
    for expression in unique {
        releases.push(install(expression, quality, settings, index, runner).await?);
    }

    let install_dir = settings.install_dir.display().to_string();
    workflow.add_path(&settings.install_dir)?;
    workflow.export_variable("DOTNET_ROOT", &install_dir)?;
    info!("Added {} to PATH", install_dir);

    Ok(releases)
}

/// Version reported through the `dotnet-version` output.
///
/// Releases whose version could not be recovered are ignored. For versions
/// coming from `global.json` the last install wins, otherwise the highest
/// version does.
pub fn select_output_version(
    releases: &[InstalledRelease],
    from_global_json: bool,
) -> Option<String> {
    let versions: Vec<&str> = releases
        .iter()
        .filter_map(|r| r.resolved_version.as_deref())
        .collect();

    if from_global_json {
        return versions.last().map(|v| v.to_string());
    }
    find_semantic_max(&versions)
}
