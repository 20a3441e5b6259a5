//! Command execution
//!
//! This module handles launching external processes for `<exec>`.

use crate::error::{ExecutionError, ExecutionResult};
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};

/// An external process to run
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Capture stdout instead of inheriting it
    pub capture: bool,
}

impl CommandSpec {
    /// Run a program directly with arguments
    pub fn program(program: impl Into<String>, args: Vec<String>, dir: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args,
            dir: dir.into(),
            env: Vec::new(),
            capture: false,
        }
    }

    /// Run a command line through an interpreter (e.g., ["sh", "-c"])
    pub fn shell(command: &str, interpreter: &[String], dir: impl Into<PathBuf>) -> Self {
        let (program, leading) = match interpreter.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => ("sh".to_string(), vec!["-c".to_string()]),
        };
        let mut args = leading;
        args.push(command.to_string());
        Self::program(program, args, dir)
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn capturing(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }
}

/// Exit status and captured output of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    /// Captured stdout, empty when not capturing
    pub stdout: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Run a process to completion
pub fn run_command(spec: &CommandSpec) -> ExecutionResult<CommandOutput> {
    let mut command = StdCommand::new(&spec.program);
    command.args(&spec.args);
    command.current_dir(&spec.dir);
    command.envs(spec.env.iter().map(|(k, v)| (k, v)));

    command.stdin(Stdio::inherit());
    command.stderr(Stdio::inherit());

    let spawn_error = |e: std::io::Error| ExecutionError::Spawn {
        program: spec.program.clone(),
        error: e.to_string(),
    };

    if spec.capture {
        command.stdout(Stdio::piped());
        let output = command.output().map_err(spawn_error)?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    } else {
        command.stdout(Stdio::inherit());
        let status = command.status().map_err(spawn_error)?;
        Ok(CommandOutput {
            code: status.code(),
            stdout: String::new(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh() -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string()]
    }

    #[test]
    fn test_shell_spec() {
        let spec = CommandSpec::shell("echo hi", &sh(), ".");
        assert_eq!(spec.program, "sh");
        assert_eq!(spec.args, vec!["-c", "echo hi"]);
    }

    #[test]
    fn test_execute_simple_command() {
        let output = run_command(&CommandSpec::shell("true", &sh(), ".")).unwrap();
        assert!(output.success());
    }

    #[test]
    fn test_execute_failing_command() {
        let output = run_command(&CommandSpec::shell("exit 3", &sh(), ".")).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
    }

    #[test]
    fn test_capture_output_with_env() {
        let spec = CommandSpec::shell("printf %s \"$GREETING\"", &sh(), ".")
            .with_env(vec![("GREETING".to_string(), "hello".to_string())])
            .capturing(true);
        let output = run_command(&spec).unwrap();
        assert_eq!(output.stdout, "hello");
    }

    #[test]
    fn test_missing_program() {
        let spec = CommandSpec::program("antler-no-such-program", vec![], ".");
        assert!(matches!(
            run_command(&spec),
            Err(ExecutionError::Spawn { .. })
        ));
    }
}
