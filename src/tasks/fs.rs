//! Filesystem tasks: `<mkdir>`, `<touch>`, `<delete>` and `<copy>`

use super::fileset::FileSet;
use crate::bind::{Element, Schema};
use crate::plugin::Task;
use crate::runner::Context;
use anyhow::Context as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Default)]
pub struct Mkdir {
    dir: PathBuf,
}

impl Element for Mkdir {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().directory("dir", |t, v| t.dir = v).required()
    }
}

impl Task for Mkdir {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        if self.dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory {}", self.dir.display()))?;
        ctx.info(format!("Created dir: {}", self.dir.display()));
        Ok(())
    }
}

/// Create a file, or bump its modification time
#[derive(Debug, Default)]
pub struct Touch {
    file: PathBuf,
}

impl Element for Touch {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().file("file", |t, v| t.file = v).required()
    }
}

impl Task for Touch {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .with_context(|| format!("Failed to touch {}", self.file.display()))?;
        file.set_modified(SystemTime::now())
            .with_context(|| format!("Failed to touch {}", self.file.display()))?;
        ctx.verbose(format!("Touched {}", self.file.display()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Delete {
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
    filesets: Vec<FileSet>,
}

impl Element for Delete {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .file("file", |t, v| t.file = Some(v))
            .directory("dir", |t, v| t.dir = Some(v))
            .child("fileset", |t, f: FileSet| t.filesets.push(f))
    }
}

impl Task for Delete {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        if self.file.is_none() && self.dir.is_none() && self.filesets.is_empty() {
            anyhow::bail!("one of 'file', 'dir' or a nested <fileset> is required");
        }

        if let Some(file) = &self.file {
            if file.is_file() {
                fs::remove_file(file)
                    .with_context(|| format!("Failed to delete {}", file.display()))?;
                ctx.info(format!("Deleting: {}", file.display()));
            } else {
                ctx.verbose(format!("Nothing to delete at {}", file.display()));
            }
        }

        if let Some(dir) = &self.dir {
            if dir.is_dir() {
                fs::remove_dir_all(dir)
                    .with_context(|| format!("Failed to delete directory {}", dir.display()))?;
                ctx.info(format!("Deleting directory {}", dir.display()));
            } else {
                ctx.verbose(format!("Nothing to delete at {}", dir.display()));
            }
        }

        for fileset in &self.filesets {
            let files = fileset.files()?;
            for relative in &files {
                let path = fileset.dir().join(relative);
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete {}", path.display()))?;
            }
            ctx.info(format!("Deleting {} files from {}", files.len(), fileset.dir().display()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CopyTask {
    file: Option<PathBuf>,
    to_file: Option<PathBuf>,
    to_dir: Option<PathBuf>,
    overwrite: bool,
    flatten: bool,
    filesets: Vec<FileSet>,
}

impl Element for CopyTask {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .file("file", |t, v| t.file = Some(v))
            .file("tofile", |t, v| t.to_file = Some(v))
            .directory("todir", |t, v| t.to_dir = Some(v))
            .boolean("overwrite", |t, v| t.overwrite = v)
            .boolean("flatten", |t, v| t.flatten = v)
            .child("fileset", |t, f: FileSet| t.filesets.push(f))
    }
}

impl CopyTask {
    /// Source and destination pairs
    fn plan(&self) -> anyhow::Result<Vec<(PathBuf, PathBuf)>> {
        let mut pairs = Vec::new();

        if let Some(file) = &self.file {
            let dest = match (&self.to_file, &self.to_dir) {
                (Some(to_file), None) => to_file.clone(),
                (None, Some(to_dir)) => match file.file_name() {
                    Some(name) => to_dir.join(name),
                    None => anyhow::bail!("'{}' is not a file name", file.display()),
                },
                _ => anyhow::bail!("'file' needs exactly one of 'tofile' or 'todir'"),
            };
            pairs.push((file.clone(), dest));
        } else if self.to_file.is_some() {
            anyhow::bail!("'tofile' requires 'file'");
        }

        if !self.filesets.is_empty() {
            let Some(to_dir) = &self.to_dir else {
                anyhow::bail!("copying a <fileset> requires 'todir'");
            };
            for fileset in &self.filesets {
                for relative in fileset.files()? {
                    let dest = if self.flatten {
                        match relative.file_name() {
                            Some(name) => to_dir.join(name),
                            None => continue,
                        }
                    } else {
                        to_dir.join(&relative)
                    };
                    pairs.push((fileset.dir().join(&relative), dest));
                }
            }
        }

        if pairs.is_empty() && self.file.is_none() && self.filesets.is_empty() {
            anyhow::bail!("specify 'file' or a nested <fileset>");
        }
        Ok(pairs)
    }

    fn is_stale(&self, source: &Path, dest: &Path) -> bool {
        if self.overwrite || !dest.exists() {
            return true;
        }
        match (modified(source), modified(dest)) {
            (Some(src), Some(dst)) => src > dst,
            _ => true,
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl Task for CopyTask {
    fn execute(&mut self, ctx: &mut Context<'_>) -> anyhow::Result<()> {
        let pairs = self.plan()?;
        let mut copied = 0;

        for (source, dest) in &pairs {
            if !source.is_file() {
                anyhow::bail!("Source file {} does not exist", source.display());
            }
            if !self.is_stale(source, dest) {
                tracing::trace!(file = %dest.display(), "up to date");
                continue;
            }
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
            fs::copy(source, dest).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), dest.display())
            })?;
            ctx.verbose(format!("Copying {} to {}", source.display(), dest.display()));
            copied += 1;
        }

        if copied > 0 {
            ctx.info(format!("Copying {} file{}", copied, if copied == 1 { "" } else { "s" }));
        }
        Ok(())
    }
}
