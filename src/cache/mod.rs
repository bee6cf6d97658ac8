//! NuGet package caching
//!
//! The restore phase runs with the setup step and the save phase in the post
//! step of the same job. The two only share the primary and matched keys,
//! passed through the workflow state.
//!
//! - [`key`]: Lock-file discovery, hashing and key format
//! - [`nuget`]: NuGet folder discovery through the .NET CLI
//! - [`backend`]: Storage abstraction and the local directory backend
//! - [`restore`] / [`save`]: The two phases

pub mod backend;
pub mod error;
pub mod key;
pub mod nuget;
pub mod restore;
pub mod save;

pub use backend::{CacheBackend, LocalCacheBackend, SaveOutcome, is_cache_feature_available};
pub use error::CacheError;
pub use restore::{CacheSettings, RestoreOutcome, restore_cache};
pub use save::{SaveResult, SkipReason, save_cache};
