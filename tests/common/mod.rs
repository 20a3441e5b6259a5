//! Common test utilities

#![allow(dead_code)]

use antler::config::{build_project, load_document};
use antler::ui::RecordingListener;
use antler::{Engine, Project, Registry};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory with a build.xml file
pub fn create_test_build(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let build_path = temp_dir.path().join("build.xml");
    fs::write(&build_path, content).unwrap();
    (temp_dir, build_path)
}

/// Create a test build file with an empty subdirectory beside it
pub fn create_test_build_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, build_path) = create_test_build(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, build_path, sub_dir)
}

pub fn load_project(build_path: &Path) -> Project {
    let root = load_document(build_path).unwrap();
    build_project(&root, Some(build_path)).unwrap()
}

/// Outcome of running a build in a scratch directory
pub struct BuildRun {
    pub result: antler::Result<()>,
    pub recorder: RecordingListener,
    pub project: Project,
    pub dir: TempDir,
}

impl BuildRun {
    pub fn property(&self, name: &str) -> Option<String> {
        self.project.properties.get(name).unwrap()
    }
}

/// Write `content` as build.xml, then run the requested targets
pub fn run_build(content: &str, targets: &[&str]) -> BuildRun {
    let (dir, build_path) = create_test_build(content);
    let mut project = load_project(&build_path);
    let registry = Registry::with_builtins().unwrap();
    let recorder = RecordingListener::new();
    let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();

    let result = Engine::new(&registry)
        .with_listener(Box::new(recorder.clone()))
        .run(&mut project, &targets);

    BuildRun {
        result,
        recorder,
        project,
        dir,
    }
}
