//! Antler - a declarative XML build tool
//!
//! A build file declares targets with dependencies, properties and tasks.
//! Antler resolves the requested targets into an execution order, expands
//! `${...}` expressions against the property store and dispatches each task
//! element to a type registered by an extension.

// Public modules
pub mod bind;
pub mod cli;
pub mod config;
pub mod error;
pub mod plugin;
pub mod project;
pub mod runner;
pub mod tasks;
pub mod ui;

// Re-export commonly used types
pub use error::{BuildError, Result};
pub use plugin::Registry;
pub use project::{Project, Target};
pub use runner::Engine;

/// Current version of Antler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
