//! Version resolution layer
//!
//! Turns the raw `dotnet-version` input into the directive handed to the
//! install script.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Expression  │────▶│  Directive  │────▶│   Quality   │
//! │  (parse)    │     │  (resolve)  │     │   (gate)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │Release index│
//!                     │ (major only)│
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`expression`]: Syntax of version expressions
//! - [`directive`]: Exact version vs. channel resolution
//! - [`release_index`]: HTTP client for the .NET release index
//! - [`quality`]: Quality tiers and the quality gate
//! - [`semver`]: Version ordering helpers
//! - [`error`]: Error types for parsing and index lookups

pub mod directive;
pub mod error;
pub mod expression;
pub mod quality;
pub mod release_index;
pub mod semver;
