//! Console output
//!
//! Prints target headers, `[task] message` lines and the build result the
//! way build tools traditionally do.

use super::listener::{BuildEvent, BuildListener, Level, LogEvent};
use colored::Colorize;
use std::time::Duration;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
    Debug = 4,
}

impl Verbosity {
    /// Lowest message level shown at this verbosity
    pub fn threshold(self) -> Option<Level> {
        match self {
            Verbosity::Silent => None,
            Verbosity::Quiet => Some(Level::Warning),
            Verbosity::Normal => Some(Level::Info),
            Verbosity::Verbose => Some(Level::Verbose),
            Verbosity::Debug => Some(Level::Debug),
        }
    }

    pub fn shows(self, level: Level) -> bool {
        self.threshold().map_or(false, |min| level >= min)
    }
}

/// Where a formatted line goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Out(String),
    Err(String),
}

/// Listener printing to stdout and stderr
#[derive(Debug, Clone)]
pub struct ConsoleListener {
    verbosity: Verbosity,
}

impl ConsoleListener {
    pub fn new(verbosity: Verbosity) -> Self {
        ConsoleListener { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Render an event, or `None` if it is not shown at this verbosity
    pub fn format(&self, event: &BuildEvent) -> Option<Line> {
        let v = self.verbosity;
        match event {
            BuildEvent::BuildStarted { project } if v >= Verbosity::Verbose => {
                let name = project.as_deref().unwrap_or("(unnamed)");
                Some(Line::Out(format!("Project: {}", name.bold())))
            }
            BuildEvent::TargetStarted { target } if v >= Verbosity::Normal => {
                Some(Line::Out(format!("\n{}:", target.bold())))
            }
            BuildEvent::TargetSkipped { target } if v >= Verbosity::Verbose => Some(Line::Out(
                format!("\n{}: {}", target.bold(), "skipped".dimmed()),
            )),
            BuildEvent::TaskStarted { task, location } if v >= Verbosity::Debug => Some(Line::Out(
                format!("{} <{}> at {}", "start".dimmed(), task, location),
            )),
            BuildEvent::TaskSkipped { task, location } if v >= Verbosity::Verbose => Some(Line::Out(
                format!("{} <{}> at {}", "skip".dimmed(), task, location),
            )),
            BuildEvent::Message(log) if v.shows(log.level) => Some(format_message(log)),
            BuildEvent::BuildFinished { error: None, duration } if v >= Verbosity::Normal => {
                Some(Line::Out(format!(
                    "\n{}\nTotal time: {}",
                    "BUILD SUCCEEDED".green().bold(),
                    format_duration(*duration)
                )))
            }
            BuildEvent::BuildFinished {
                error: Some(error),
                duration,
            } if v >= Verbosity::Quiet => Some(Line::Err(format!(
                "\n{}\n\n{}\n\nTotal time: {}",
                "BUILD FAILED".red().bold(),
                error,
                format_duration(*duration)
            ))),
            _ => None,
        }
    }
}

fn format_message(log: &LogEvent) -> Line {
    let prefix = match &log.task {
        Some(task) => format!("{:>12} ", format!("[{}]", task)),
        None => String::new(),
    };

    match log.level {
        Level::Error => Line::Err(format!("{}{}", prefix, log.message.red())),
        Level::Warning => Line::Err(format!("{}{}", prefix, log.message.yellow())),
        Level::Info => Line::Out(format!("{}{}", prefix, log.message)),
        Level::Verbose | Level::Debug => Line::Out(format!("{}{}", prefix, log.message.dimmed())),
    }
}

/// Human-readable duration: `850ms`, `2.50s`, `1m 5s`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:02}s", secs, millis / 10)
    } else {
        format!("{}ms", millis)
    }
}

impl BuildListener for ConsoleListener {
    fn on_event(&mut self, event: &BuildEvent) {
        match self.format(event) {
            Some(Line::Out(line)) => println!("{}", line),
            Some(Line::Err(line)) => eprintln!("{}", line),
            None => {}
        }
    }
}
