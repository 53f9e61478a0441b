use std::path::{Path, PathBuf};

use crate::config::schema::Settings;
use crate::error::SettingsError;

pub const ENV_WORKING_DIR: &str = "AZMIGRATE_WORKING_DIR";
pub const ENV_DEPENDENCY_TABLE: &str = "AZMIGRATE_DEPENDENCY_TABLE";

/// Loads settings from an optional JSON file, then applies environment
/// overrides. Without a file the defaults are used.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| SettingsError::ReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;
            parse_settings(&content)?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings);
    validate_settings(&settings)?;

    Ok(settings)
}

/// Parses and validates settings without looking at the environment.
pub fn load_settings_from_str(content: &str) -> Result<Settings, SettingsError> {
    let settings = parse_settings(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn parse_settings(content: &str) -> Result<Settings, SettingsError> {
    Ok(serde_json::from_str(content)?)
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Some(dir) = env_path(ENV_WORKING_DIR) {
        log::debug!("{} overrides working directory", ENV_WORKING_DIR);
        settings.working_dir = dir;
    }
    if let Some(table) = env_path(ENV_DEPENDENCY_TABLE) {
        log::debug!("{} overrides dependency table", ENV_DEPENDENCY_TABLE);
        settings.dependency_table = Some(table);
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.extensions.is_empty() {
        return Err(SettingsError::Validation {
            message: "At least one configuration file extension is required".to_string(),
        });
    }

    for ext in &settings.extensions {
        let trimmed = ext.trim();
        if trimmed.is_empty() || trimmed.contains('/') || trimmed.starts_with('.') {
            return Err(SettingsError::Validation {
                message: format!("Invalid extension '{}': use a bare suffix like 'tf'", ext),
            });
        }
    }

    if settings.working_dir.as_os_str().is_empty() {
        return Err(SettingsError::Validation {
            message: "Working directory must not be empty".to_string(),
        });
    }

    Ok(())
}
