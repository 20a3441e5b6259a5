//! Build file discovery and settings parsing

use crate::config::types::Settings;
use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file name, both in the user config directory and beside the build file
pub const SETTINGS_FILE_NAME: &str = "antler.yml";

/// Find the build file in the current directory, optionally searching parents
pub fn find_build_file(file_name: &str, search_parents: bool) -> ConfigResult<PathBuf> {
    let current_dir = env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?;

    if search_parents {
        find_build_file_from(current_dir, file_name)
    } else {
        let path = current_dir.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ConfigError::NotFound(path.display().to_string()))
        }
    }
}

/// Find the build file starting from a specific directory and walking upwards
pub fn find_build_file_from(start_dir: PathBuf, file_name: &str) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        let candidate = current_dir.join(file_name);
        searched_paths.push(candidate.display().to_string());

        if candidate.is_file() {
            return Ok(candidate);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse settings from a YAML string
pub fn parse_settings(yaml: &str) -> Result<Settings, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(yaml)
}

/// Parse a settings file, if it exists
pub fn parse_settings_file(path: &Path) -> ConfigResult<Option<Settings>> {
    if !path.is_file() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Settings {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_settings(&contents)
        .map(Some)
        .map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Location of the per-user settings file
pub fn user_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "antler").map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
}

/// Load user settings merged with the settings beside the build file
pub fn load_settings(project_dir: Option<&Path>) -> ConfigResult<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = user_settings_path() {
        if let Some(user) = parse_settings_file(&path)? {
            tracing::debug!(path = %path.display(), "loaded user settings");
            settings = settings.merge(user);
        }
    }

    if let Some(dir) = project_dir {
        let path = dir.join(SETTINGS_FILE_NAME);
        if let Some(project) = parse_settings_file(&path)? {
            tracing::debug!(path = %path.display(), "loaded project settings");
            settings = settings.merge(project);
        }
    }

    Ok(settings)
}

/// Split a `name=value` command-line property definition
pub fn parse_property_definition(definition: &str) -> ConfigResult<(String, String)> {
    let (name, value) = definition
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidPropertyDefinition(definition.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidPropertyDefinition(definition.to_string()));
    }

    Ok((name.to_string(), value.to_string()))
}

/// Read the variables of a dotenv file, in file order
pub fn load_env_file(path: &Path) -> ConfigResult<Vec<(String, String)>> {
    let env_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let mut vars = Vec::new();
    for item in dotenvy::from_path_iter(path).map_err(env_error)? {
        vars.push(item.map_err(env_error)?);
    }
    Ok(vars)
}
