//! Build listeners
//!
//! The engine reports progress and task messages as [`BuildEvent`]s to a
//! [`BuildListener`]. How events are shown or stored is up to the listener.

use crate::config::Location;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Severity of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Verbose,
    Info,
    Warning,
    Error,
}

impl Level {
    pub const NAMES: &'static [&'static str] = &["debug", "verbose", "info", "warning", "error"];

    /// Parse one of [`Level::NAMES`]
    pub fn from_name(name: &str) -> Option<Level> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(Level::Debug),
            "verbose" => Some(Level::Verbose),
            "info" => Some(Level::Info),
            "warning" | "warn" => Some(Level::Warning),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "debug",
            Level::Verbose => "verbose",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

/// A message logged during the build
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: Level,
    pub message: String,
    pub target: Option<String>,
    pub task: Option<String>,
    pub location: Option<Location>,
}

impl LogEvent {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        LogEvent {
            level,
            message: message.into(),
            target: None,
            task: None,
            location: None,
        }
    }

    pub fn with_target(mut self, target: Option<&str>) -> Self {
        self.target = target.map(str::to_string);
        self
    }

    pub fn with_task(mut self, task: Option<&str>) -> Self {
        self.task = task.map(str::to_string);
        self
    }

    pub fn with_location(mut self, location: Option<&Location>) -> Self {
        self.location = location.cloned();
        self
    }
}

/// Progress and messages of a build
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    BuildStarted { project: Option<String> },
    /// `error` holds the rendered failure, if the build failed
    BuildFinished { error: Option<String>, duration: Duration },
    TargetStarted { target: String },
    TargetFinished { target: String, success: bool },
    /// The target's if/unless disabled it
    TargetSkipped { target: String },
    TaskStarted { task: String, location: Location },
    TaskFinished { task: String, success: bool },
    TaskSkipped { task: String, location: Location },
    Message(LogEvent),
}

/// Receives build events
pub trait BuildListener {
    fn on_event(&mut self, event: &BuildEvent);
}

/// Creates a listener registered by an extension
pub type ListenerFactory = fn() -> Box<dyn BuildListener>;

/// Forwards every event to each contained listener in order
#[derive(Default)]
pub struct ListenerSet {
    listeners: Vec<Box<dyn BuildListener>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Box<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    pub fn with(mut self, listener: Box<dyn BuildListener>) -> Self {
        self.add(listener);
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl BuildListener for ListenerSet {
    fn on_event(&mut self, event: &BuildEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

/// Keeps every event in memory. Clones share the same event list, so a
/// clone can be handed to the engine and the original inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Rc<RefCell<Vec<BuildEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BuildEvent> {
        self.events.borrow().clone()
    }

    /// Messages logged at `level` or above
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                BuildEvent::Message(log) if log.level >= level => Some(log.message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of the targets that started, in order
    pub fn targets_started(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                BuildEvent::TargetStarted { target } => Some(target.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of the tasks that started, in order
    pub fn tasks_started(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                BuildEvent::TaskStarted { task, .. } => Some(task.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl BuildListener for RecordingListener {
    fn on_event(&mut self, event: &BuildEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
