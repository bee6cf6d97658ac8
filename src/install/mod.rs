//! SDK installation
//!
//! - [`orchestrator`]: One install from expression to reported version
//! - [`multi`]: Several installs in one invocation and the reported version
//! - [`arguments`]: Install script flags per script dialect
//! - [`sdk`]: SDKs already installed on the machine

pub mod arguments;
pub mod error;
pub mod multi;
pub mod orchestrator;
pub mod sdk;

pub use error::InstallError;
pub use multi::{install_all, select_output_version};
pub use orchestrator::{InstallSettings, InstalledRelease, install};
