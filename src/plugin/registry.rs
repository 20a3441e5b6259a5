//! Plugin registry

use super::extension::Extension;
use super::scanner::{Discovered, Scanner};
use super::TaskType;
use crate::error::ScanError;
use crate::runner::functions::FunctionRegistry;
use crate::tasks::BuiltinExtension;
use crate::ui::{BuildListener, ListenerFactory};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Task types, expression functions and listener plugins by name
pub struct Registry {
    tasks: HashMap<String, Arc<dyn TaskType>>,
    functions: Arc<FunctionRegistry>,
    listeners: HashMap<String, ListenerFactory>,
    extensions: Vec<String>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Registry {
            tasks: HashMap::new(),
            functions: Arc::new(FunctionRegistry::new()),
            listeners: HashMap::new(),
            extensions: Vec::new(),
        }
    }

    /// A registry holding the built-in tasks, functions and listeners
    pub fn with_builtins() -> Result<Self, ScanError> {
        let mut registry = Self::new();
        registry.load(&BuiltinExtension)?;
        Ok(registry)
    }

    /// Scan an extension and register everything it provides. Nothing is
    /// registered if the scan fails.
    pub fn load(&mut self, extension: &dyn Extension) -> Result<usize, ScanError> {
        let discovered = Scanner::new(self).scan(extension)?;
        let count = discovered.len();
        self.register(discovered);
        Ok(count)
    }

    fn register(&mut self, discovered: Discovered) {
        for (name, task) in discovered.tasks {
            self.tasks.insert(name, task);
        }
        if !discovered.functions.is_empty() {
            let functions = Arc::make_mut(&mut self.functions);
            for set in discovered.functions {
                functions.register_set(set);
            }
        }
        for (name, factory) in discovered.listeners {
            self.listeners.insert(name, factory);
        }
        tracing::debug!(extension = %discovered.extension, "registered extension");
        self.extensions.push(discovered.extension);
    }

    pub fn task(&self, name: &str) -> Option<&dyn TaskType> {
        self.tasks.get(name).map(|t| t.as_ref())
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Sorted task names
    pub fn task_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Function table shared with property stores
    pub fn functions(&self) -> Arc<FunctionRegistry> {
        Arc::clone(&self.functions)
    }

    /// Create a registered listener
    pub fn listener(&self, name: &str) -> Option<Box<dyn BuildListener>> {
        self.listeners.get(name).map(|factory| factory())
    }

    /// Sorted listener names
    pub fn listener_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.listeners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of loaded extensions, in load order
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tasks", &self.task_names())
            .field("functions", &self.functions.len())
            .field("listeners", &self.listener_names())
            .field("extensions", &self.extensions)
            .finish()
    }
}
