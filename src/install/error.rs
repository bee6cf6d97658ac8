use std::path::PathBuf;

use thiserror::Error;

use crate::version::error::{RegistryError, VersionError};
use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Neither pwsh nor powershell was found on PATH")]
    ShellNotFound,

    #[error("Failed to make {} executable: {source}", .path.display())]
    ScriptPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install dotnet, exit code: {exit_code}. {stderr}")]
    InstallationFailed { exit_code: i32, stderr: String },

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}
