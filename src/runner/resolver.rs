//! Target dependency resolution
//!
//! Produces the order in which targets run: every dependency before its
//! dependent, each target once. Requested targets are visited in the order
//! given and dependencies in the order they are declared in `depends`, so
//! unrelated siblings run first-declared-first.

use crate::error::ResolutionError;
use crate::project::Project;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Resolver<'a> {
    project: &'a Project,
    marks: HashMap<&'a str, Mark>,
    /// Targets currently being visited, outermost first
    stack: Vec<&'a str>,
    order: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn visit(&mut self, name: &'a str, dependent: Option<&str>) -> Result<(), ResolutionError> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut path: Vec<String> = self.stack[start..].iter().map(|n| n.to_string()).collect();
                path.push(name.to_string());
                return Err(ResolutionError::CircularDependency { path });
            }
            None => {}
        }

        let target = self.project.target(name).ok_or_else(|| match dependent {
            Some(target) => ResolutionError::UnknownDependency {
                target: target.to_string(),
                dependency: name.to_string(),
            },
            None => ResolutionError::UnknownTarget(name.to_string()),
        })?;

        self.marks.insert(name, Mark::InProgress);
        self.stack.push(name);

        for dependency in &target.depends {
            self.visit(dependency, Some(name))?;
        }

        self.stack.pop();
        self.marks.insert(name, Mark::Done);
        self.order.push(name.to_string());
        tracing::trace!(target_name = name, position = self.order.len(), "resolved target");
        Ok(())
    }
}

/// Order the requested targets and everything they depend on
pub fn resolve(project: &Project, requested: &[String]) -> Result<Vec<String>, ResolutionError> {
    let mut resolver = Resolver {
        project,
        marks: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
    };

    for name in requested {
        resolver.visit(name, None)?;
    }

    tracing::debug!(order = ?resolver.order, "execution order");
    Ok(resolver.order)
}

/// Pick the targets to build: requested, then the project default, then
/// the configured fallback list
pub fn select_targets(
    project: &Project,
    requested: &[String],
    fallback: &[String],
) -> Result<Vec<String>, ResolutionError> {
    if !requested.is_empty() {
        return Ok(requested.to_vec());
    }
    if let Some(default) = &project.default_target {
        return Ok(vec![default.clone()]);
    }
    if !fallback.is_empty() {
        return Ok(fallback.to_vec());
    }
    Err(ResolutionError::NoTarget)
}
