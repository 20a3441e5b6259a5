//! Project structure validation
//!
//! Turns a parsed `<project>` element into a `Project`, checking the parts of
//! the structure that do not depend on any task type.

use crate::config::document::XmlElement;
use crate::error::{DocumentError, DocumentResult};
use crate::project::{Project, Target};
use std::path::{Path, PathBuf};

const PROJECT_ATTRIBUTES: &[&str] = &["name", "default", "basedir"];
const TARGET_ATTRIBUTES: &[&str] = &["name", "depends", "description", "if", "unless"];

/// Build a project from its root element
pub fn build_project(root: &XmlElement, build_file: Option<&Path>) -> DocumentResult<Project> {
    if root.name != "project" {
        return Err(DocumentError::NotAProject {
            found: root.name.clone(),
            location: root.location.clone(),
        });
    }
    check_attributes(root, PROJECT_ATTRIBUTES)?;

    let file_dir = build_file
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let base_dir = match root.attribute("basedir") {
        Some(dir) => file_dir.join(dir),
        None => file_dir,
    };

    let mut project = Project::new(base_dir);
    project.name = root.attribute("name").map(str::to_string);
    project.default_target = root
        .attribute("default")
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    project.build_file = build_file.map(Path::to_path_buf);

    for child in &root.children {
        match child.name.as_str() {
            "description" => project.description = child.text.clone(),
            "target" => {
                let target = build_target(child)?;
                if let Err(rejected) = project.add_target(target) {
                    return Err(DocumentError::DuplicateTarget {
                        name: rejected.name,
                        location: child.location.clone(),
                    });
                }
            }
            _ => project.global_tasks.push(child.clone()),
        }
    }

    validate_project(&project)?;
    Ok(project)
}

/// Build a target from a `<target>` element
pub fn build_target(element: &XmlElement) -> DocumentResult<Target> {
    check_attributes(element, TARGET_ATTRIBUTES)?;

    let name = element
        .attribute("name")
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DocumentError::MissingTargetName {
            location: element.location.clone(),
        })?;

    let mut description = element.attribute("description").map(str::to_string);
    let mut tasks = Vec::new();
    for child in &element.children {
        if child.name == "description" {
            description = child.text.clone();
        } else {
            tasks.push(child.clone());
        }
    }

    Ok(Target {
        name: name.to_string(),
        description,
        depends: split_depends(element.attribute("depends").unwrap_or("")),
        if_condition: element.attribute("if").map(str::to_string),
        unless_condition: element.attribute("unless").map(str::to_string),
        tasks,
        location: element.location.clone(),
    })
}

/// Split a comma-separated `depends` list
pub fn split_depends(depends: &str) -> Vec<String> {
    depends
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check that the default target and every dependency name exist
pub fn validate_project(project: &Project) -> DocumentResult<()> {
    if let Some(default) = &project.default_target {
        if !project.has_target(default) {
            return Err(DocumentError::UnknownDefaultTarget(default.clone()));
        }
    }

    for target in project.targets() {
        for dependency in &target.depends {
            if !project.has_target(dependency) {
                return Err(DocumentError::UnknownDependency {
                    target: target.name.clone(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    Ok(())
}

fn check_attributes(element: &XmlElement, allowed: &[&str]) -> DocumentResult<()> {
    for (name, _) in &element.attributes {
        if !allowed.contains(&name.as_str()) {
            return Err(DocumentError::UnknownAttribute {
                attribute: name.clone(),
                element: element.name.clone(),
                location: element.location.clone(),
            });
        }
    }
    Ok(())
}
