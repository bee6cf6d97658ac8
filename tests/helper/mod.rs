//! Shared fakes for the integration tests

#![allow(dead_code)]

mod runner;
mod services;

pub use runner::{RecordingRunner, install_output, locals_output};
pub use services::{FakeReleaseIndex, MemoryWorkflow, OfflineBackend};
