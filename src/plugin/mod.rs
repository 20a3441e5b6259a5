//! Task, function and listener plugins
//!
//! Extensions describe the types they provide; the [`Scanner`] checks them
//! and the [`Registry`] holds the result for the dispatcher and evaluator.
//! A registry is built once at startup and only read while a build runs.

pub mod extension;
pub mod registry;
pub mod scanner;

pub use extension::{Extension, TypeDescriptor, TypeKind};
pub use registry::Registry;
pub use scanner::{Discovered, Scanner};

use crate::bind::{Binder, Element};
use crate::config::XmlElement;
use crate::error::BindingResult;
use crate::runner::Context;
use std::marker::PhantomData;

/// A build action configured from an element and executed once
pub trait Task: Element {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()>;
}

/// A bound task ready to run
pub trait RunnableTask {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()>;
}

impl<T: Task> RunnableTask for T {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        Task::execute(self, ctx)
    }
}

/// A registered task type: binds elements into runnable tasks
pub trait TaskType: Send + Sync {
    /// Bind an element; `None` when if/unless disabled it
    fn bind(&self, binder: &Binder<'_>, element: &XmlElement) -> BindingResult<Option<Box<dyn RunnableTask>>>;

    /// Check the task's schema
    fn verify(&self) -> Result<(), String>;
}

/// [`TaskType`] for a concrete [`Task`]
pub struct TaskDescriptor<T>(PhantomData<fn() -> T>);

impl<T> TaskDescriptor<T> {
    pub fn new() -> Self {
        TaskDescriptor(PhantomData)
    }
}

impl<T> Default for TaskDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Task> TaskType for TaskDescriptor<T> {
    fn bind(&self, binder: &Binder<'_>, element: &XmlElement) -> BindingResult<Option<Box<dyn RunnableTask>>> {
        Ok(binder
            .bind_task::<T>(element)?
            .map(|task| Box::new(task) as Box<dyn RunnableTask>))
    }

    fn verify(&self) -> Result<(), String> {
        T::schema().verify()
    }
}
