//! `<echo>` and `<fail>`

use crate::bind::{Element, Schema};
use crate::plugin::Task;
use crate::runner::Context;
use crate::ui::Level;
use anyhow::Context as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Log a message, or write it to a file
#[derive(Debug, Default)]
pub struct Echo {
    message: Option<String>,
    text: Option<String>,
    level: String,
    file: Option<PathBuf>,
    append: bool,
}

impl Element for Echo {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .string("message", |t, v| t.message = Some(v))
            .choice("level", Level::NAMES, |t, v| t.level = v)
            .default_value("info")
            .file("file", |t, v| t.file = Some(v))
            .boolean("append", |t, v| t.append = v)
            .text(|t, v| t.text = Some(v))
    }
}

impl Task for Echo {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let message = self
            .message
            .take()
            .or_else(|| self.text.take())
            .unwrap_or_default();

        if let Some(path) = &self.file {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(self.append)
                .truncate(!self.append)
                .open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            writeln!(file, "{}", message)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            return Ok(());
        }

        let level = Level::from_name(&self.level).unwrap_or(Level::Info);
        ctx.log(level, message);
        Ok(())
    }
}

/// Stop the build with a message
#[derive(Debug, Default)]
pub struct Fail {
    message: Option<String>,
    text: Option<String>,
}

impl Element for Fail {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .string("message", |t, v| t.message = Some(v))
            .text(|t, v| t.text = Some(v))
    }
}

impl Task for Fail {
    fn execute(&mut self, _ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let message = self
            .message
            .take()
            .or_else(|| self.text.take())
            .unwrap_or_else(|| "No message".to_string());
        anyhow::bail!(message)
    }
}
