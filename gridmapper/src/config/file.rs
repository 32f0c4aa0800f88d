//! Reading and writing the INI config file, plus the values derived from it.
//!
//! A missing file is not an error: the mapper runs on [`ConfigFile::default`]
//! until `init-config` writes one.

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, MAX_UPDATE_INTERVAL_SECS};
use super::settings::ConfigFile;

/// Name of the metadata snapshot inside the storage directory.
pub const METADATA_FILE_NAME: &str = "metadata.json";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// A key was present but its value is unusable
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        super::parser::parse_ini(&Ini::load_from_file(path)?)
    }

    /// Write every setting to `path`, creating missing parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }
        std::fs::write(path, super::writer::to_config_string(self))
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.storage.directory.join(METADATA_FILE_NAME)
    }

    /// Delay before a grid image is requested again.
    ///
    /// Values above [`MAX_UPDATE_INTERVAL_SECS`] are clamped; the parser
    /// rejects them, but the struct can be built by hand.
    pub fn update_interval(&self) -> chrono::Duration {
        let secs = self.grid.update_interval.min(MAX_UPDATE_INTERVAL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn repair_interval(&self) -> Duration {
        Duration::from_secs(self.repair.interval)
    }
}

/// `~/.gridmapper`, or `./.gridmapper` when there is no home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}
