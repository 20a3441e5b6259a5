//! `<exec>`

use crate::bind::{Element, Schema, Validator};
use crate::error::ExecutionError;
use crate::plugin::Task;
use crate::runner::{run_command, CommandSpec, Context};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct Arg {
    value: String,
}

impl Element for Arg {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().string("value", |t, v| t.value = v).required()
    }
}

#[derive(Debug, Default)]
pub struct EnvVar {
    name: String,
    value: String,
}

impl Element for EnvVar {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .string("name", |t, v| t.name = v)
            .required()
            .validate(Validator::NonEmpty)
            .string("value", |t, v| t.value = v)
            .default_value("")
    }
}

/// Run an external program, or a command line through the interpreter
#[derive(Debug, Default)]
pub struct Exec {
    program: Option<String>,
    command: Option<String>,
    dir: Option<PathBuf>,
    result_property: Option<String>,
    output_property: Option<String>,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl Element for Exec {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .string("program", |t, v| t.program = Some(v))
            .validate(Validator::NonEmpty)
            .string("command", |t, v| t.command = Some(v))
            .validate(Validator::NonEmpty)
            .directory("dir", |t, v| t.dir = Some(v))
            .string("resultproperty", |t, v| t.result_property = Some(v))
            .string("outputproperty", |t, v| t.output_property = Some(v))
            .child("arg", |t, a: Arg| t.args.push(a.value))
            .child("env", |t, e: EnvVar| t.env.push((e.name, e.value)))
    }
}

impl Exec {
    fn spec(&self, ctx: &Context<'_>) -> anyhow::Result<CommandSpec> {
        let dir = self.dir.clone().unwrap_or_else(|| ctx.base_dir.clone());
        let spec = match (&self.program, &self.command) {
            (Some(program), None) => CommandSpec::program(program.as_str(), self.args.clone(), dir),
            (None, Some(command)) => {
                if !self.args.is_empty() {
                    anyhow::bail!("nested <arg> elements need 'program', not 'command'");
                }
                CommandSpec::shell(command, &ctx.interpreter, dir)
            }
            _ => anyhow::bail!("exactly one of 'program' or 'command' is required"),
        };
        Ok(spec
            .with_env(self.env.clone())
            .capturing(self.output_property.is_some()))
    }
}

impl Task for Exec {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let spec = self.spec(ctx)?;
        ctx.verbose(format!("Executing {} {}", spec.program, spec.args.join(" ")));

        let output = run_command(&spec)?;

        if let Some(name) = &self.result_property {
            let code = output.code.map_or_else(|| "-1".to_string(), |c| c.to_string());
            ctx.properties.set(name.as_str(), code, true);
        }
        if let Some(name) = &self.output_property {
            ctx.properties
                .set(name.as_str(), output.stdout.trim_end().to_string(), true);
        }

        if !output.success() {
            return Err(ExecutionError::CommandFailed(output.code).into());
        }
        Ok(())
    }
}
