//! Engine settings types
//!
//! This module defines the data structures that represent an antler.yml settings file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default build file name
pub const DEFAULT_BUILD_FILE: &str = "build.xml";

/// Top-level settings structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Properties seeded before the build file is read
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,

    /// Build file name used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_file: Option<String>,

    /// Interpreter for `<exec command="...">` (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Name of the listener plugin to report build events to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<String>,

    /// Targets to run when neither the command line nor the project names one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_targets: Vec<String>,
}

impl Settings {
    /// Merge `other` over `self`, key by key
    pub fn merge(mut self, other: Settings) -> Settings {
        self.properties.extend(other.properties);
        if other.build_file.is_some() {
            self.build_file = other.build_file;
        }
        if other.interpreter.is_some() {
            self.interpreter = other.interpreter;
        }
        if other.listener.is_some() {
            self.listener = other.listener;
        }
        if !other.default_targets.is_empty() {
            self.default_targets = other.default_targets;
        }
        self
    }

    /// Build file name, falling back to `build.xml`
    pub fn build_file_name(&self) -> &str {
        self.build_file.as_deref().unwrap_or(DEFAULT_BUILD_FILE)
    }

    /// Interpreter argv, falling back to the platform shell
    pub fn interpreter(&self) -> Vec<String> {
        match &self.interpreter {
            Some(interpreter) if !interpreter.is_empty() => interpreter.clone(),
            _ => default_interpreter(),
        }
    }
}

/// Platform shell used to run command strings
pub fn default_interpreter() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}
