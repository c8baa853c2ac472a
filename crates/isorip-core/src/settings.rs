//! Persistent user settings for isorip
//!
//! Settings are stored in a TOML configuration file at:
//! - Linux: `~/.config/isorip/isorip_config.toml`
//! - macOS: `~/Library/Application Support/isorip/isorip_config.toml`
//! - Windows: `%APPDATA%\isorip\isorip_config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! [copy]
//! chunk_blocks = 512
//! flush_each_write = true
//! decrypt = true
//!
//! [behavior]
//! quiet = false
//! ```

use crate::config::{CopyConfig, DEFAULT_CHUNK_BLOCKS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration file name
const CONFIG_FILE_NAME: &str = "isorip_config.toml";

/// Application name for config directory
const APP_NAME: &str = "isorip";

/// User settings loaded from configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Copy operation settings
    pub copy: CopySettings,

    /// Behavior settings
    pub behavior: BehaviorSettings,
}

/// Settings for copy operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CopySettings {
    /// Nominal blocks per read (512 = 1 MiB)
    pub chunk_blocks: usize,

    /// Whether to flush the image after every write
    pub flush_each_write: bool,

    /// Whether to request decryption from the reader
    pub decrypt: bool,
}

/// General behavior settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BehaviorSettings {
    /// Whether to suppress non-error output
    pub quiet: bool,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            chunk_blocks: DEFAULT_CHUNK_BLOCKS,
            flush_each_write: true,
            decrypt: true,
        }
    }
}

impl CopySettings {
    /// Runtime configuration built from these settings
    pub fn to_config(&self) -> CopyConfig {
        CopyConfig::new()
            .chunk_blocks(self.chunk_blocks)
            .flush_each_write(self.flush_each_write)
            .decrypt(self.decrypt)
    }
}

impl Settings {
    /// Load settings from the configuration file
    ///
    /// Returns default settings if the file doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::load_from_path(Self::config_path())
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config path available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => {
                    tracing::debug!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to a specific path
    pub fn save_to_path(&self, path: Option<PathBuf>) -> Result<PathBuf, SettingsError> {
        let path = path.ok_or(SettingsError::NoConfigDir)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let contents = toml::to_string_pretty(self).map_err(SettingsError::Serialize)?;

        std::fs::write(&path, contents).map_err(|e| SettingsError::Io {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!("Saved settings to {:?}", path);
        Ok(path)
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|p| p.join(APP_NAME).join(CONFIG_FILE_NAME))
    }
}

/// Errors that can occur when working with settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No configuration directory available
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// Failed to read or write config file
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path that caused the error
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    Serialize(toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.copy.chunk_blocks, 512);
        assert!(settings.copy.flush_each_write);
        assert!(settings.copy.decrypt);
        assert!(!settings.behavior.quiet);
    }

    #[test]
    fn test_settings_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("isorip_config.toml");

        let settings = Settings {
            copy: CopySettings {
                chunk_blocks: 64,
                flush_each_write: false,
                decrypt: false,
            },
            behavior: BehaviorSettings { quiet: true },
        };

        settings.save_to_path(Some(config_path.clone())).unwrap();
        assert!(config_path.exists());

        let loaded = Settings::load_from_path(Some(config_path));
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let settings =
            Settings::load_from_path(Some(PathBuf::from("/nonexistent/isorip_config.toml")));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_no_path() {
        let settings = Settings::load_from_path(None);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("isorip_config.toml");

        std::fs::write(&config_path, "[copy]\nchunk_blocks = 32\n").unwrap();

        let settings = Settings::load_from_path(Some(config_path));

        assert_eq!(settings.copy.chunk_blocks, 32);
        assert!(settings.copy.decrypt);
        assert!(!settings.behavior.quiet);
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("isorip_config.toml");

        std::fs::write(&config_path, "this is not valid toml {{{{").unwrap();

        let settings = Settings::load_from_path(Some(config_path));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_to_none_path() {
        let result = Settings::default().save_to_path(None);
        assert!(matches!(result, Err(SettingsError::NoConfigDir)));
    }

    #[test]
    fn test_to_config_clamps_chunk() {
        let copy = CopySettings {
            chunk_blocks: 0,
            flush_each_write: false,
            decrypt: true,
        };
        let config = copy.to_config();
        assert_eq!(config.chunk_blocks, crate::MIN_CHUNK_BLOCKS);
        assert!(!config.flush_each_write);
        assert!(config.decrypt);
    }

    #[test]
    fn test_config_path() {
        if let Some(p) = Settings::config_path() {
            assert!(p.to_string_lossy().contains("isorip"));
            assert!(p.to_string_lossy().ends_with("isorip_config.toml"));
        }
    }

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::NoConfigDir;
        assert!(err.to_string().contains("configuration directory"));

        let io_err = SettingsError::Io {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(io_err.to_string().contains("/test/path"));
    }
}
