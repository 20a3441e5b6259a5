//! Structured logging of build events through `tracing`

use super::listener::{BuildEvent, BuildListener, Level};

/// Forwards build events to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl TracingListener {
    pub fn new() -> Self {
        TracingListener
    }

    /// Boxed, for registration as a listener plugin
    pub fn boxed() -> Box<dyn BuildListener> {
        Box::new(TracingListener)
    }
}

impl BuildListener for TracingListener {
    fn on_event(&mut self, event: &BuildEvent) {
        match event {
            BuildEvent::BuildStarted { project } => {
                tracing::info!(project = project.as_deref().unwrap_or(""), "build started");
            }
            BuildEvent::BuildFinished { error: None, duration } => {
                tracing::info!(elapsed_ms = duration.as_millis() as u64, "build succeeded");
            }
            BuildEvent::BuildFinished {
                error: Some(error),
                duration,
            } => {
                tracing::error!(elapsed_ms = duration.as_millis() as u64, %error, "build failed");
            }
            BuildEvent::TargetStarted { target } => {
                tracing::info!(target_name = %target, "target started");
            }
            BuildEvent::TargetFinished { target, success } => {
                tracing::debug!(target_name = %target, success, "target finished");
            }
            BuildEvent::TargetSkipped { target } => {
                tracing::debug!(target_name = %target, "target skipped");
            }
            BuildEvent::TaskStarted { task, location } => {
                tracing::debug!(task = %task, %location, "task started");
            }
            BuildEvent::TaskFinished { task, success } => {
                tracing::debug!(task = %task, success, "task finished");
            }
            BuildEvent::TaskSkipped { task, location } => {
                tracing::debug!(task = %task, %location, "task skipped");
            }
            BuildEvent::Message(log) => {
                let task = log.task.as_deref().unwrap_or("");
                let target = log.target.as_deref().unwrap_or("");
                match log.level {
                    Level::Error => tracing::error!(task, target_name = target, "{}", log.message),
                    Level::Warning => tracing::warn!(task, target_name = target, "{}", log.message),
                    Level::Info => tracing::info!(task, target_name = target, "{}", log.message),
                    Level::Verbose => tracing::debug!(task, target_name = target, "{}", log.message),
                    Level::Debug => tracing::trace!(task, target_name = target, "{}", log.message),
                }
            }
        }
    }
}
