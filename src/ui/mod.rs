//! Build output
//!
//! Listeners that turn build events into console output, structured logs or
//! an in-memory record.

pub mod console;
pub mod listener;
pub mod tracing_listener;

pub use console::{format_duration, ConsoleListener, Verbosity};
pub use listener::{
    BuildEvent, BuildListener, Level, ListenerFactory, ListenerSet, LogEvent, RecordingListener,
};
pub use tracing_listener::TracingListener;
