//! Extension modules and the types they expose

use super::{Task, TaskDescriptor, TaskType};
use crate::runner::functions::FunctionSet;
use crate::ui::ListenerFactory;
use std::fmt;
use std::sync::Arc;

/// What a descriptor provides
#[derive(Clone)]
pub enum TypeKind {
    Task(Arc<dyn TaskType>),
    Functions(FunctionSet),
    Listener(ListenerFactory),
}

/// A named type offered by an extension
#[derive(Clone)]
pub struct TypeDescriptor {
    pub name: String,
    /// Abstract types are skipped by the scanner
    pub is_abstract: bool,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// A task registered under its element tag name
    pub fn task<T: Task>(name: &str) -> Self {
        TypeDescriptor {
            name: name.to_string(),
            is_abstract: false,
            kind: TypeKind::Task(Arc::new(TaskDescriptor::<T>::new())),
        }
    }

    /// A function set, named by its namespace
    pub fn functions(set: FunctionSet) -> Self {
        TypeDescriptor {
            name: set.namespace.to_string(),
            is_abstract: false,
            kind: TypeKind::Functions(set),
        }
    }

    pub fn listener(name: &str, factory: ListenerFactory) -> Self {
        TypeDescriptor {
            name: name.to_string(),
            is_abstract: false,
            kind: TypeKind::Listener(factory),
        }
    }

    /// Mark as abstract
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TypeKind::Task(_) => "task",
            TypeKind::Functions(_) => "function set",
            TypeKind::Listener(_) => "listener",
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind_name())
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

/// A module of plugin types
pub trait Extension {
    fn name(&self) -> &str;

    fn types(&self) -> Vec<TypeDescriptor>;
}
