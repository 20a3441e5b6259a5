//! Build documents and engine settings
//!
//! This module handles loading build files into element trees, validating
//! the project structure, and parsing antler.yml settings.

pub mod document;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use document::*;
pub use parse::*;
pub use schema::*;
pub use types::*;
