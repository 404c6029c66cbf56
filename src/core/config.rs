/*
 * Persisted user preferences, currently just the interface language. The
 * preferences live as a small JSON file in the platform's configuration
 * directory. A trait-based surface (`ConfigManagerOperations`) allows mock
 * implementations for tests of the application logic.
 */
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

const PREFERENCES_FILENAME: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppPreferences {
    /// BCP 47 language tag such as "en-US", `None` meaning the default.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoConfigDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration format error: {e}"),
            ConfigError::NoConfigDirectory => {
                write!(f, "Could not determine a configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_preferences(&self, app_name: &str) -> Result<AppPreferences>;
    fn save_preferences(&self, app_name: &str, preferences: &AppPreferences) -> Result<()>;
}

pub struct CoreConfigManager {}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {}
    }

    fn preferences_path(&self, app_name: &str) -> Result<PathBuf> {
        let config_dir =
            path_utils::get_app_config_dir(app_name).ok_or(ConfigError::NoConfigDirectory)?;
        Ok(config_dir.join(PREFERENCES_FILENAME))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    /*
     * Loads the preferences file, falling back to defaults when the file
     * does not exist yet. A file that exists but does not parse is an
     * error: silently discarding it would also discard the user's choices.
     */
    fn load_preferences(&self, app_name: &str) -> Result<AppPreferences> {
        let file_path = self.preferences_path(app_name)?;
        if !file_path.exists() {
            log::debug!("CoreConfigManager: No preferences file at {file_path:?}, using defaults");
            return Ok(AppPreferences::default());
        }
        let contents = fs::read_to_string(&file_path)?;
        let preferences: AppPreferences = serde_json::from_str(&contents)?;
        log::debug!("CoreConfigManager: Loaded preferences from {file_path:?}");
        Ok(preferences)
    }

    fn save_preferences(&self, app_name: &str, preferences: &AppPreferences) -> Result<()> {
        let file_path = self.preferences_path(app_name)?;
        let json = serde_json::to_string_pretty(preferences)?;
        fs::write(&file_path, json)?;
        log::debug!("CoreConfigManager: Saved preferences to {file_path:?}");
        Ok(())
    }
}
