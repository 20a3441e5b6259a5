//! `<loadenv>`

use crate::bind::{Element, Schema};
use crate::config::load_env_file;
use crate::plugin::Task;
use crate::runner::Context;
use std::path::PathBuf;

/// Load a dotenv file into properties
#[derive(Debug, Default)]
pub struct LoadEnv {
    file: PathBuf,
    prefix: Option<String>,
}

impl Element for LoadEnv {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .file("file", |t, v| t.file = v)
            .required()
            .string("prefix", |t, v| t.prefix = Some(v))
    }
}

impl Task for LoadEnv {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let vars = load_env_file(&self.file)?;
        let prefix = self
            .prefix
            .as_deref()
            .map(|p| p.trim_end_matches('.'))
            .filter(|p| !p.is_empty());

        let count = vars.len();
        for (key, value) in vars {
            let name = match prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key,
            };
            ctx.properties.set(name, value, false);
        }
        ctx.verbose(format!("Loaded {} variables from {}", count, self.file.display()));
        Ok(())
    }
}
