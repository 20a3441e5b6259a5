//! Project and target model
//!
//! A `Project` is the parsed, structural definition of a build file plus the
//! property store that mutates while the build runs.

use crate::config::{Location, XmlElement};
use crate::runner::PropertyStore;
use std::collections::HashMap;
use std::path::PathBuf;

/// A named, orderable unit of build work
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub name: String,
    pub description: Option<String>,
    /// Dependency names in declaration order (may contain duplicates)
    pub depends: Vec<String>,
    /// Raw `if` condition text
    pub if_condition: Option<String>,
    /// Raw `unless` condition text
    pub unless_condition: Option<String>,
    /// Task elements in document order
    pub tasks: Vec<XmlElement>,
    pub location: Location,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            description: None,
            depends: Vec::new(),
            if_condition: None,
            unless_condition: None,
            tasks: Vec::new(),
            location: Location::unknown(),
        }
    }

    pub fn with_depends(mut self, depends: &[&str]) -> Self {
        self.depends = depends.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_task(mut self, task: XmlElement) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_if(mut self, condition: impl Into<String>) -> Self {
        self.if_condition = Some(condition.into());
        self
    }

    pub fn with_unless(mut self, condition: impl Into<String>) -> Self {
        self.unless_condition = Some(condition.into());
        self
    }
}

/// Root entity of a build
#[derive(Debug)]
pub struct Project {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_target: Option<String>,
    pub base_dir: PathBuf,
    /// Path of the build file, when loaded from disk
    pub build_file: Option<PathBuf>,
    /// Tasks declared directly under `<project>`, run before any target
    pub global_tasks: Vec<XmlElement>,
    targets: HashMap<String, Target>,
    /// Target names in declaration order, for listings
    target_order: Vec<String>,
    pub properties: PropertyStore,
}

impl Project {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Project {
            name: None,
            description: None,
            default_target: None,
            base_dir: base_dir.into(),
            build_file: None,
            global_tasks: Vec::new(),
            targets: HashMap::new(),
            target_order: Vec::new(),
            properties: PropertyStore::new(),
        }
    }

    /// Add a target; returns the rejected target if the name is taken
    pub fn add_target(&mut self, target: Target) -> Result<(), Target> {
        if self.targets.contains_key(&target.name) {
            return Err(target);
        }
        self.target_order.push(target.name.clone());
        self.targets.insert(target.name.clone(), target);
        Ok(())
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn has_target(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Targets in declaration order
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.target_order.iter().filter_map(|name| self.targets.get(name))
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}
