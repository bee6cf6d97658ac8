use std::path::PathBuf;

use thiserror::Error;

use crate::cache::CacheError;
use crate::install::InstallError;
use crate::version::error::VersionError;
use crate::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("The specified global.json file '{0}' does not exist")]
    GlobalJsonNotFound(PathBuf),

    #[error("Unable to read global.json file '{path}': {reason}")]
    GlobalJson { path: PathBuf, reason: String },

    #[error("Unable to write problem matcher '{path}': {source}")]
    ProblemMatcher {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}
