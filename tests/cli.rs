//! Command-line tests

mod common;

use assert_cmd::Command;
use common::{create_test_build, create_test_build_in_subdir};
use predicates::prelude::*;
use std::fs;

const BUILD: &str = r#"<project name="demo" default="greet">
  <property name="who" value="world"/>
  <target name="init" description="Prepare">
    <echo message="init for ${who}"/>
  </target>
  <target name="greet" depends="init" description="Say hello">
    <echo message="hello ${who}"/>
  </target>
  <target name="broken">
    <fail message="it broke"/>
  </target>
</project>
"#;

fn antler() -> Command {
    let mut cmd = Command::cargo_bin("antler").unwrap();
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1").env("CLICOLOR", "0");
    cmd
}

#[test]
fn test_runs_default_target() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("init:"))
        .stdout(predicate::str::contains("[echo] hello world"))
        .stdout(predicate::str::contains("BUILD SUCCEEDED"));
}

#[test]
fn test_define_overrides_build_file_property() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .args(["greet", "-D", "who=antler"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello antler"));
}

#[test]
fn test_env_file_seeds_properties() {
    let (dir, _) = create_test_build(BUILD);
    fs::write(dir.path().join("local.env"), "who=dotenv\n").unwrap();
    antler()
        .current_dir(dir.path())
        .args(["--env-file", "local.env"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello dotenv"));
}

#[test]
fn test_failed_build_exits_nonzero() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .arg("broken")
        .assert()
        .failure()
        .stderr(predicate::str::contains("BUILD FAILED"))
        .stderr(predicate::str::contains("it broke"));
}

#[test]
fn test_unknown_target_fails() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nope'"));
}

#[test]
fn test_quiet_hides_messages() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello").not());
}

#[test]
fn test_project_help() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .arg("-p")
        .assert()
        .success()
        .stdout(predicate::str::contains("Main targets:"))
        .stdout(predicate::str::contains("greet  Say hello"))
        .stdout(predicate::str::contains("Default target: greet"))
        .stdout(predicate::str::contains("hello world").not());
}

#[test]
fn test_explicit_file_and_find() {
    let (dir, build_path, sub_dir) = create_test_build_in_subdir(BUILD);

    antler()
        .current_dir(&sub_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to find build file"));

    antler()
        .current_dir(&sub_dir)
        .arg("--find")
        .assert()
        .success()
        .stdout(predicate::str::contains("hello world"));

    antler()
        .current_dir(&sub_dir)
        .arg("-f")
        .arg(&build_path)
        .assert()
        .success();

    drop(dir);
}

#[test]
fn test_unknown_listener() {
    let (dir, _) = create_test_build(BUILD);
    antler()
        .current_dir(dir.path())
        .args(["--listener", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown listener 'nope'"));
}

#[test]
fn test_completions() {
    antler()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("antler"));
}
