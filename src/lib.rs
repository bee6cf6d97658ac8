pub mod action;
pub mod cache;
pub mod config;
pub mod install;
pub mod logging;
pub mod platform;
pub mod process;
pub mod version;
pub mod workflow;
