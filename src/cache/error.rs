use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Some specified paths were not resolved, unable to cache dependencies.")]
    LockFileNotFound { patterns: Vec<String> },

    #[error("Failed to hash {path}: {source}")]
    HashingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache folder path is retrieved for .NET CLI but doesn't exist on disk: {0}")]
    CachePathMissing(PathBuf),

    #[error("The .NET CLI did not report a global-packages folder")]
    MissingNuGetFolder,

    /// `stderr` is reported verbatim when the command wrote one
    #[error("{}", command_failure_message(.command, .exit_code, .stderr))]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("Failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Cache action is only supported on GHES version >= 3.5. If you are on version >=3.5 Please check with GHES admin if Actions cache service is enabled or not."
    )]
    UnsupportedServer,

    #[error("Invalid lock file pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

fn command_failure_message(command: &str, exit_code: &i32, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        format!("The '{command}' command failed with exit code: {exit_code}")
    } else {
        stderr.to_string()
    }
}
