//! Host platform detection and executable lookup

use std::ffi::OsString;
use std::path::PathBuf;

use crate::install::arguments::ArgumentDialect;

/// Operating system family of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::MacOs
        }
    }

    /// Name used by CI runners in `RUNNER_OS`
    pub fn runner_os(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
        }
    }

    /// Argument dialect understood by this platform's install script
    pub fn dialect(&self) -> ArgumentDialect {
        match self {
            Platform::Windows => ArgumentDialect::PowerShell,
            Platform::Linux | Platform::MacOs => ArgumentDialect::Posix,
        }
    }

    pub fn script_name(&self) -> &'static str {
        match self {
            Platform::Windows => "install-dotnet.ps1",
            Platform::Linux | Platform::MacOs => "install-dotnet.sh",
        }
    }

    pub fn dotnet_name(&self) -> &'static str {
        match self {
            Platform::Windows => "dotnet.exe",
            Platform::Linux | Platform::MacOs => "dotnet",
        }
    }
}

/// Label used inside cache keys. `RUNNER_OS` wins over the compiled-in platform.
pub fn cache_platform_label(runner_os: Option<String>, platform: Platform) -> String {
    runner_os
        .filter(|os| !os.is_empty())
        .unwrap_or_else(|| platform.runner_os().to_string())
}

/// Finds the first PowerShell host on `path_var`, preferring `pwsh`
pub fn find_powershell(path_var: Option<OsString>) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    ["pwsh", "powershell"]
        .into_iter()
        .find_map(|name| which::which_in(name, path_var.as_ref(), &cwd).ok())
}
