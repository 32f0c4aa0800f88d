//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Storage settings
    pub storage: StorageSettings,
    /// Grid upload settings
    pub grid: GridSettings,
    /// Repair pass scheduling
    pub repair: RepairSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    /// Root holding image files and `metadata.json`
    pub directory: PathBuf,
}

/// Grid upload configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Edge length of a grid image in pixels
    pub tile_size: u32,
    /// Seconds before an uploaded grid image is requested again
    pub update_interval: u64,
}

/// Repair pass configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairSettings {
    /// Seconds between scheduled repair passes
    pub interval: u64,
    /// Maximum parent tiles recomposited per pass
    pub max_tiles: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory for log files
    pub directory: PathBuf,
    /// Log file name inside `directory`
    pub file: String,
}
