//! Built-in tasks
//!
//! Everything here is registered through [`BuiltinExtension`], the same way
//! a third-party extension would provide its own tasks.

pub mod echo;
pub mod exec;
pub mod fileset;
pub mod fs;
pub mod if_task;
pub mod loadenv;
pub mod property;

pub use echo::{Echo, Fail};
pub use exec::Exec;
pub use fileset::FileSet;
pub use fs::{CopyTask, Delete, Mkdir, Touch};
pub use if_task::IfTask;
pub use loadenv::LoadEnv;
pub use property::PropertyTask;

use crate::plugin::{Extension, TypeDescriptor};
use crate::runner::functions::builtins::function_sets;
use crate::ui::TracingListener;

/// The tasks, functions and listeners that ship with antler
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinExtension;

impl Extension for BuiltinExtension {
    fn name(&self) -> &str {
        "builtin"
    }

    fn types(&self) -> Vec<TypeDescriptor> {
        let mut types = vec![
            TypeDescriptor::task::<Echo>("echo"),
            TypeDescriptor::task::<PropertyTask>("property"),
            TypeDescriptor::task::<Fail>("fail"),
            TypeDescriptor::task::<Mkdir>("mkdir"),
            TypeDescriptor::task::<Touch>("touch"),
            TypeDescriptor::task::<Delete>("delete"),
            TypeDescriptor::task::<CopyTask>("copy"),
            TypeDescriptor::task::<Exec>("exec"),
            TypeDescriptor::task::<LoadEnv>("loadenv"),
            TypeDescriptor::task::<IfTask>("if"),
            TypeDescriptor::listener("tracing", TracingListener::boxed),
        ];
        types.extend(function_sets().into_iter().map(TypeDescriptor::functions));
        types
    }
}
