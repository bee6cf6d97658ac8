//! NuGet local folders as reported by the .NET CLI

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::cache::error::CacheError;
use crate::config::NUGET_LOCALS_ARGS;
use crate::process::{CommandRunner, CommandSpec};

static FOLDER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*([a-z-]+): (.+[/\\].+?)[ \t\r]*$").unwrap());

/// Folders from `dotnet nuget locals all --list`. Unreported folders are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NuGetFolderPaths {
    pub http_cache: String,
    pub global_packages: String,
    pub temp: String,
    pub plugins_cache: String,
}

impl NuGetFolderPaths {
    /// Parses `key: path` lines, ignoring unknown keys
    pub fn parse(stdout: &str) -> Self {
        let mut paths = Self::default();
        for caps in FOLDER_LINE_RE.captures_iter(stdout) {
            let value = caps[2].to_string();
            match &caps[1] {
                "http-cache" => paths.http_cache = value,
                "global-packages" => paths.global_packages = value,
                "temp" => paths.temp = value,
                "plugins-cache" => paths.plugins_cache = value,
                _ => {}
            }
        }
        paths
    }
}

/// Runs the .NET CLI to list the NuGet folders
pub async fn nuget_folder_paths(
    runner: &dyn CommandRunner,
    dotnet: &Path,
) -> Result<NuGetFolderPaths, CacheError> {
    let command = CommandSpec::new(dotnet).args(NUGET_LOCALS_ARGS.iter().copied());
    let display = command.display();

    let output = runner
        .run(&command)
        .await
        .map_err(|source| CacheError::Spawn {
            command: display.clone(),
            source,
        })?;

    if !output.success() {
        return Err(CacheError::CommandFailed {
            command: display,
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    Ok(NuGetFolderPaths::parse(&output.stdout))
}
