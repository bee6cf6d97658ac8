use std::path::{Component, Path, PathBuf};

use crate::platform::Platform;

// =============================================================================
// Version resolution
// =============================================================================

/// Release index listing every .NET channel, newest first
pub const RELEASES_INDEX_URL: &str =
    "https://builds.dotnet.microsoft.com/dotnet/release-metadata/releases-index.json";

/// Quality tiers are only understood by installers of .NET 6 and later
pub const QUALITY_MINIMAL_MAJOR: u64 = 6;

/// The `A.B.Cxx` feature band syntax exists since .NET 5
pub const LATEST_PATCH_MINIMAL_MAJOR: u64 = 5;

/// Attempts per release index request, including the first one
pub const HTTP_MAX_ATTEMPTS: u32 = 3;

/// Base delay between release index attempts (doubled after each failure)
pub const HTTP_RETRY_BACKOFF_MS: u64 = 500;

// =============================================================================
// Cache
// =============================================================================

/// Default NuGet lock-file patterns searched in the workspace root
pub const DEFAULT_LOCK_FILE_PATTERNS: &[&str] = &["packages.lock.json"];

/// Prefix of every primary cache key
pub const CACHE_KEY_PREFIX: &str = "dotnet-cache";

/// Arguments of the .NET CLI command listing the NuGet local folders
pub const NUGET_LOCALS_ARGS: &[&str] = &[
    "nuget",
    "locals",
    "all",
    "--list",
    "--force-english-output",
];

/// State shared between the restore and save phases of a job
pub mod state {
    pub const CACHE_PRIMARY_KEY: &str = "CACHE_KEY";
    pub const CACHE_MATCHED_KEY: &str = "CACHE_RESULT";
}

/// Step outputs
pub mod outputs {
    pub const CACHE_HIT: &str = "cache-hit";
    pub const DOTNET_VERSION: &str = "dotnet-version";
}

/// How to treat a quality input that the resolved directive cannot honour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum QualityPolicy {
    /// Drop the quality flag and emit a warning
    #[default]
    Warn,
    /// Drop the quality flag silently
    Ignore,
}

/// Returns the directory the SDKs get installed into.
/// Honours `DOTNET_INSTALL_DIR`, otherwise picks the platform default.
pub fn install_dir(platform: Platform) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_install_dir(
        platform,
        std::env::var("DOTNET_INSTALL_DIR").ok(),
        dirs::home_dir(),
        std::env::var("PROGRAMFILES").ok().map(PathBuf::from),
        &cwd,
    )
}

/// Returns the directory holding the local cache backend.
/// Uses `<data dir>/setup-dotnet/cache`, or `./setup-dotnet/cache` when no data dir exists.
pub fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("setup-dotnet")
        .join("cache")
}

/// Returns the install script shipped next to the executable, under `externals/`.
pub fn default_install_script(platform: Platform) -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("externals").join(platform.script_name())
}

/// Returns the `dotnet` executable inside the install directory if present,
/// otherwise the bare name so it gets looked up on PATH.
pub fn dotnet_executable(install_dir: &Path, platform: Platform) -> PathBuf {
    let candidate = install_dir.join(platform.dotnet_name());
    if candidate.is_file() {
        candidate
    } else {
        PathBuf::from(platform.dotnet_name())
    }
}

pub(crate) fn resolve_install_dir(
    platform: Platform,
    override_dir: Option<String>,
    home_dir: Option<PathBuf>,
    program_files: Option<PathBuf>,
    cwd: &Path,
) -> PathBuf {
    let home = home_dir.unwrap_or_else(|| PathBuf::from("."));

    if let Some(dir) = override_dir.filter(|d| !d.is_empty()) {
        let path = Path::new(&dir);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(rest) = dir.strip_prefix('~') {
            home.join(rest.trim_start_matches(['/', '\\']))
        } else {
            cwd.join(path)
        };
        return normalize(&absolute);
    }

    match platform {
        Platform::Windows => program_files
            .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"))
            .join("dotnet"),
        Platform::Linux => PathBuf::from("/usr/share/dotnet"),
        Platform::MacOs => home.join(".dotnet"),
    }
}

/// Lexically resolves `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
