//! Typed attribute binding
//!
//! Element types declare their configuration surface as a [`Schema`] and the
//! [`Binder`] fills a fresh instance from an XML element: conditions first,
//! then attributes (expanded, converted, validated), text content and nested
//! elements.

pub mod binder;
pub mod convert;
pub mod schema;
pub mod validate;

pub use binder::{Binder, TASK_ATTRIBUTES};
pub use convert::{AttributeKind, AttributeValue};
pub use schema::{AttributeSpec, ChildSpec, Schema};
pub use validate::Validator;

/// A type that can be configured from a build file element
pub trait Element: Default + 'static {
    fn schema() -> Schema<Self>;
}
