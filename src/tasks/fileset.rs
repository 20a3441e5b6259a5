//! `<fileset>` nested element
//!
//! A fileset names the files under a directory that match its include
//! patterns and none of its exclude patterns. Patterns are relative to the
//! directory; `*` stays within one path component and `**` spans any number
//! of them. With no includes, every file is selected.

use crate::bind::{Element, Schema, Validator};
use anyhow::Context as _;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

const DEFAULT_INCLUDE: &str = "**/*";

/// `<include name="..."/>` or `<exclude name="..."/>`
#[derive(Debug, Default)]
pub struct PatternEntry {
    name: String,
}

impl Element for PatternEntry {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .string("name", |t, v| t.name = v)
            .required()
            .validate(Validator::NonEmpty)
    }
}

#[derive(Debug, Default)]
pub struct FileSet {
    dir: PathBuf,
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl Element for FileSet {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .directory("dir", |t, v| t.dir = v)
            .required()
            .string("includes", |t, v| t.includes.extend(split_patterns(&v)))
            .string("excludes", |t, v| t.excludes.extend(split_patterns(&v)))
            .child("include", |t, e: PatternEntry| t.includes.push(e.name))
            .child("exclude", |t, e: PatternEntry| t.excludes.push(e.name))
    }
}

fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

impl FileSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileSet {
            dir: dir.into(),
            ..Default::default()
        }
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.includes.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.excludes.push(pattern.to_string());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Matching files, relative to the fileset directory, sorted
    pub fn files(&self) -> anyhow::Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            anyhow::bail!("fileset directory {} does not exist", self.dir.display());
        }

        let excludes = build_globset(&self.excludes)?;
        let root = glob::Pattern::escape(&self.dir.to_string_lossy());
        let includes: Vec<&str> = if self.includes.is_empty() {
            vec![DEFAULT_INCLUDE]
        } else {
            self.includes.iter().map(String::as_str).collect()
        };

        let mut files = Vec::new();
        for pattern in includes {
            let full = format!("{}/{}", root, pattern);
            let paths = glob::glob(&full).with_context(|| format!("Invalid include pattern '{}'", pattern))?;
            for entry in paths {
                let path = entry?;
                if !path.is_file() {
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.dir) else {
                    continue;
                };
                if excludes.is_match(relative) {
                    tracing::trace!(path = %relative.display(), "excluded");
                    continue;
                }
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid exclude pattern '{}'", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in ["a.txt", "b.rs", "sub/c.txt", "sub/deep/d.txt", "sub/e.log"] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file).unwrap();
        }
        dir
    }

    fn names(files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_default_selects_everything() {
        let dir = tree();
        let files = FileSet::new(dir.path()).files().unwrap();
        assert_eq!(
            names(files),
            vec!["a.txt", "b.rs", "sub/c.txt", "sub/deep/d.txt", "sub/e.log"]
        );
    }

    #[test]
    fn test_star_stays_in_one_directory() {
        let dir = tree();
        let files = FileSet::new(dir.path()).include("*.txt").files().unwrap();
        assert_eq!(names(files), vec!["a.txt"]);

        let files = FileSet::new(dir.path()).include("**/*.txt").files().unwrap();
        assert_eq!(names(files), vec!["a.txt", "sub/c.txt", "sub/deep/d.txt"]);
    }

    #[test]
    fn test_excludes_apply_after_includes() {
        let dir = tree();
        let files = FileSet::new(dir.path())
            .include("**/*.txt")
            .include("sub/*")
            .exclude("sub/deep/**")
            .files()
            .unwrap();
        assert_eq!(names(files), vec!["a.txt", "sub/c.txt", "sub/e.log"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tree();
        assert!(FileSet::new(dir.path().join("nope")).files().is_err());
    }

    #[test]
    fn test_split_patterns() {
        assert_eq!(split_patterns(" *.rs, ,*.txt "), vec!["*.rs", "*.txt"]);
    }
}
