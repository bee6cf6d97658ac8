//! Install script argument construction

use std::path::Path;

use crate::version::directive::{DirectiveKind, VersionDirective};

/// Flag spelling of the two install scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentDialect {
    /// `install-dotnet.sh`
    Posix,
    /// `install-dotnet.ps1`
    PowerShell,
}

impl ArgumentDialect {
    pub fn version_flag(&self) -> &'static str {
        match self {
            ArgumentDialect::Posix => "--version",
            ArgumentDialect::PowerShell => "-Version",
        }
    }

    pub fn channel_flag(&self) -> &'static str {
        match self {
            ArgumentDialect::Posix => "--channel",
            ArgumentDialect::PowerShell => "-Channel",
        }
    }

    pub fn quality_flag(&self) -> &'static str {
        match self {
            ArgumentDialect::Posix => "--quality",
            ArgumentDialect::PowerShell => "-Quality",
        }
    }

    pub fn install_dir_flag(&self) -> &'static str {
        match self {
            ArgumentDialect::Posix => "--install-dir",
            ArgumentDialect::PowerShell => "-InstallDir",
        }
    }

    pub fn skip_non_versioned_files_flag(&self) -> &'static str {
        match self {
            ArgumentDialect::Posix => "--skip-non-versioned-files",
            ArgumentDialect::PowerShell => "-SkipNonVersionedFiles",
        }
    }

    /// Flag value as it must appear on the command line. PowerShell joins
    /// everything after `-Command` into one script, so values are quoted.
    pub fn value(&self, value: &str) -> String {
        match self {
            ArgumentDialect::Posix => value.to_string(),
            ArgumentDialect::PowerShell => powershell_quote(value),
        }
    }

    fn directive_flag(&self, kind: DirectiveKind) -> &'static str {
        match kind {
            DirectiveKind::ExactVersion => self.version_flag(),
            DirectiveKind::Channel => self.channel_flag(),
        }
    }
}

/// Proxy configuration taken from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub https_proxy: Option<String>,
    pub no_proxy: Option<String>,
}

impl ProxySettings {
    pub fn from_env() -> Self {
        Self::from_values(std::env::var("https_proxy").ok(), std::env::var("no_proxy").ok())
    }

    /// Empty values count as unset
    pub fn from_values(https_proxy: Option<String>, no_proxy: Option<String>) -> Self {
        Self {
            https_proxy: https_proxy.filter(|v| !v.is_empty()),
            no_proxy: no_proxy.filter(|v| !v.is_empty()),
        }
    }

    /// Proxy flags for the PowerShell script. The POSIX script reads the
    /// variables from its inherited environment instead.
    fn arguments(&self, dialect: ArgumentDialect) -> Vec<String> {
        if dialect != ArgumentDialect::PowerShell {
            return Vec::new();
        }

        let mut args = Vec::new();
        if let Some(proxy) = &self.https_proxy {
            args.extend(["-ProxyAddress".to_string(), dialect.value(proxy)]);
        }
        if let Some(bypass) = &self.no_proxy {
            args.extend(["-ProxyBypassList".to_string(), dialect.value(bypass)]);
        }
        args
    }
}

/// Version or channel selector: `--channel 8.0`, `-Version 8.0.100`
pub fn directive_arguments(directive: &VersionDirective, dialect: ArgumentDialect) -> Vec<String> {
    vec![
        dialect.directive_flag(directive.kind).to_string(),
        directive.value.clone(),
    ]
}

/// Install location and proxy arguments
pub fn location_arguments(
    install_dir: &Path,
    skip_non_versioned_files: bool,
    proxy: &ProxySettings,
    dialect: ArgumentDialect,
) -> Vec<String> {
    let mut args = vec![
        dialect.install_dir_flag().to_string(),
        dialect.value(&install_dir.display().to_string()),
    ];
    if skip_non_versioned_files {
        args.push(dialect.skip_non_versioned_files_flag().to_string());
    }
    args.extend(proxy.arguments(dialect));
    args
}

/// Single-quote a value for a PowerShell `-Command` string
pub fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
