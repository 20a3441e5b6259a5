//! Execution context for task running
//!
//! The context tracks all the state a task can see while it executes: the
//! property store, the project base directory, the listener and the
//! registry used to dispatch nested tasks.

use crate::config::{default_interpreter, Location, XmlElement};
use crate::error::BuildError;
use crate::plugin::Registry;
use crate::runner::{dispatch, PropertyStore};
use crate::ui::{BuildEvent, BuildListener, Level, LogEvent};
use std::path::{Path, PathBuf};

/// A task currently executing
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub task: String,
    pub location: Location,
}

/// Execution context that tracks state during task execution
pub struct Context<'a> {
    /// Build properties; tasks may read and write them
    pub properties: &'a mut PropertyStore,

    /// Project base directory
    pub base_dir: PathBuf,

    /// Interpreter for shell commands (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,

    registry: &'a Registry,
    listener: &'a mut dyn BuildListener,

    /// Target whose tasks are running
    target: Option<String>,

    /// Stack of tasks being executed, innermost last
    task_stack: Vec<Frame>,
}

impl<'a> Context<'a> {
    pub fn new(
        properties: &'a mut PropertyStore,
        registry: &'a Registry,
        listener: &'a mut dyn BuildListener,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Context {
            properties,
            base_dir: base_dir.into(),
            interpreter: default_interpreter(),
            registry,
            listener,
            target: None,
            task_stack: Vec::new(),
        }
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        if !interpreter.is_empty() {
            self.interpreter = interpreter;
        }
        self
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a path against the base directory
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn set_target(&mut self, target: Option<&str>) {
        self.target = target.map(str::to_string);
    }

    /// Name of the running target
    pub fn current_target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Push a task onto the execution stack
    pub fn push_task(&mut self, task: &str, location: &Location) {
        self.task_stack.push(Frame {
            task: task.to_string(),
            location: location.clone(),
        });
    }

    /// Pop a task from the execution stack
    pub fn pop_task(&mut self) -> Option<Frame> {
        self.task_stack.pop()
    }

    /// Get the current task (top of stack)
    pub fn current_task(&self) -> Option<&Frame> {
        self.task_stack.last()
    }

    /// Names of the tasks on the stack, outermost first
    pub fn task_names(&self) -> Vec<&str> {
        self.task_stack.iter().map(|f| f.task.as_str()).collect()
    }

    /// Send an event to the listener
    pub fn emit(&mut self, event: BuildEvent) {
        self.listener.on_event(&event);
    }

    /// Log a message attributed to the current target and task
    pub fn log(&mut self, level: Level, message: impl Into<String>) {
        let frame = self.task_stack.last();
        let event = LogEvent::new(level, message)
            .with_target(self.target.as_deref())
            .with_task(frame.map(|f| f.task.as_str()))
            .with_location(frame.map(|f| &f.location));
        self.listener.on_event(&BuildEvent::Message(event));
    }

    /// Print info message
    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    /// Print warning message
    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    /// Print verbose message
    pub fn verbose(&mut self, message: impl Into<String>) {
        self.log(Level::Verbose, message);
    }

    /// Dispatch task elements in order, as for a target's tasks
    pub fn execute_tasks(&mut self, tasks: &[XmlElement]) -> Result<(), BuildError> {
        dispatch::execute_tasks(tasks, self)
    }
}
