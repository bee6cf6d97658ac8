//! The two steps of the action
//!
//! - [`setup`]: Installs SDKs, reports the version and restores the cache
//! - [`post`]: Saves the cache at the end of the job
//! - [`global_json`]: Version pinned by `global.json`
//! - [`problem_matcher`]: Annotations for C# compiler diagnostics

pub mod error;
pub mod global_json;
pub mod post;
pub mod problem_matcher;
pub mod setup;

pub use error::SetupError;
pub use post::run_post;
pub use setup::{Services, SetupEnvironment, SetupInputs, SetupReport, run_setup};
