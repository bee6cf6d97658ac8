//! C# compiler problem matcher
//!
//! The runner turns build output lines matching the matcher into annotations.
//! The matcher definition ships inside the binary and is written next to the
//! job's temporary files before it is registered.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::action::error::SetupError;
use crate::workflow::Workflow;

const CSC_MATCHER: &str = include_str!("../../matchers/csc.json");

pub const CSC_MATCHER_FILE: &str = "csc.json";

/// Writes `csc.json` into `dir` and registers it with the runner
pub fn register_problem_matcher(
    dir: &Path,
    workflow: &dyn Workflow,
) -> Result<PathBuf, SetupError> {
    let path = dir.join(CSC_MATCHER_FILE);
    let io_err = |source| SetupError::ProblemMatcher {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    std::fs::write(&path, CSC_MATCHER).map_err(io_err)?;
    workflow.add_matcher(&path)?;
    debug!("Registered problem matcher {}", path.display());

    Ok(path)
}
