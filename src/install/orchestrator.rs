//! Single SDK installation
//!
//! Each install walks the same states: parse the expression, resolve it to a
//! directive, build the script arguments, run the script, interpret its exit
//! code, then recover the installed version from its output.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::QualityPolicy;
use crate::install::arguments::{
    ArgumentDialect, ProxySettings, directive_arguments, location_arguments, powershell_quote,
};
use crate::install::error::InstallError;
use crate::platform::Platform;
use crate::process::{CommandRunner, CommandSpec};
use crate::version::directive::VersionDirective;
use crate::version::expression::VersionExpression;
use crate::version::quality::{Quality, quality_arguments};
use crate::version::release_index::ReleaseIndex;

/// Options passed to PowerShell before the `-Command` script block
const POWERSHELL_OPTIONS: &[&str] = &[
    "-NoLogo",
    "-Sta",
    "-NoProfile",
    "-NonInteractive",
    "-ExecutionPolicy",
    "Unrestricted",
    "-Command",
];

static INSTALLED_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+[a-z0-9._-]*").unwrap());

/// Everything an install needs besides the requested version
#[derive(Debug, Clone)]
pub struct InstallSettings {
    pub platform: Platform,
    /// `install-dotnet.sh` or `install-dotnet.ps1`
    pub script: PathBuf,
    /// PowerShell host running the script on Windows
    pub shell: Option<PathBuf>,
    pub install_dir: PathBuf,
    pub quality_policy: QualityPolicy,
    pub proxy: ProxySettings,
    pub skip_non_versioned_files: bool,
}

/// Outcome of one successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRelease {
    pub requested_expression: String,
    /// `None` when the script succeeded but its output named no version
    pub resolved_version: Option<String>,
}

/// Install the SDK matching `expression`
pub async fn install(
    expression: &str,
    quality: Option<Quality>,
    settings: &InstallSettings,
    index: &dyn ReleaseIndex,
    runner: &dyn CommandRunner,
) -> Result<InstalledRelease, InstallError> {
    let parsed = VersionExpression::parse(expression)?;
    let directive = VersionDirective::resolve(&parsed, index).await?;
    debug!("Resolved '{}' to {:?}", expression.trim(), directive);

    let dialect = settings.platform.dialect();
    let mut args = directive_arguments(&directive, dialect);
    args.extend(quality_arguments(
        &directive,
        quality,
        settings.quality_policy,
        dialect,
    ));
    args.extend(location_arguments(
        &settings.install_dir,
        settings.skip_non_versioned_files,
        &settings.proxy,
        dialect,
    ));

    let command = install_command(settings, dialect, args)?;
    info!("Installing .NET SDK {} into {}", directive.value, settings.install_dir.display());

    let output = runner
        .run(&command)
        .await
        .map_err(|source| InstallError::Spawn {
            program: command.program.display().to_string(),
            source,
        })?;

    if !output.success() {
        return Err(InstallError::InstallationFailed {
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    let resolved_version = parse_installed_version(&output.stdout);
    match &resolved_version {
        Some(version) => info!("Installed .NET SDK {}", version),
        None => warn!("Failed to parse installed by the script version of .NET"),
    }

    Ok(InstalledRelease {
        requested_expression: expression.trim().to_string(),
        resolved_version,
    })
}

fn install_command(
    settings: &InstallSettings,
    dialect: ArgumentDialect,
    args: Vec<String>,
) -> Result<CommandSpec, InstallError> {
    let command = match dialect {
        ArgumentDialect::Posix => {
            ensure_executable(&settings.script).map_err(|source| {
                InstallError::ScriptPermissions {
                    path: settings.script.clone(),
                    source,
                }
            })?;
            CommandSpec::new(&settings.script).args(args)
        }
        ArgumentDialect::PowerShell => {
            let shell = settings.shell.as_ref().ok_or(InstallError::ShellNotFound)?;
            CommandSpec::new(shell)
                .args(POWERSHELL_OPTIONS.iter().copied())
                .args(["&".to_string(), powershell_quote(&settings.script.display().to_string())])
                .args(args)
        }
    };

    Ok(command.env(
        "DOTNET_INSTALL_DIR",
        settings.install_dir.display().to_string(),
    ))
}

/// Adds the exec bits to a script that lacks them. A missing script is left
/// for the spawn to report.
#[cfg(unix)]
fn ensure_executable(script: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match std::fs::metadata(script) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let mode = metadata.permissions().mode();
    if mode & 0o111 == 0o111 {
        return Ok(());
    }

    debug!("Setting exec bits on {}", script.display());
    std::fs::set_permissions(script, std::fs::Permissions::from_mode(mode | 0o111))
}

#[cfg(not(unix))]
fn ensure_executable(_script: &Path) -> std::io::Result<()> {
    Ok(())
}

/// First dotted three-part version in the script output
pub fn parse_installed_version(stdout: &str) -> Option<String> {
    INSTALLED_VERSION_RE
        .find(stdout)
        .map(|m| m.as_str().to_string())
}
