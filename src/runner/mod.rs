//! Build execution engine
//!
//! This module holds the property store and expression language, target
//! resolution, task dispatch and the engine that drives a build.

pub mod build;
pub mod command;
pub mod condition;
pub mod context;
pub mod dispatch;
pub mod expr;
pub mod functions;
pub mod interpolate;
pub mod properties;
pub mod resolver;

// Re-export main types
pub use build::Engine;
pub use command::{run_command, CommandOutput, CommandSpec};
pub use context::{Context, Frame};
pub use interpolate::{interpolate, interpolate_list};
pub use properties::{Property, PropertyStore};
pub use resolver::{resolve, select_targets};
