//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::compose::DEFAULT_TILE_SIZE;
use crate::ingest::DEFAULT_GRID_UPDATE_INTERVAL_SECS;
use crate::pyramid::{DEFAULT_REPAIR_INTERVAL_SECS, DEFAULT_REPAIR_MAX_TILES};

/// Name of the configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".gridmapper";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Storage directory name under the config directory.
pub const DEFAULT_STORAGE_DIR_NAME: &str = "data";

/// Default log directory, relative to the working directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "gridmapper.log";

/// Smallest accepted tile size; composites halve tiles so it must be even.
pub const MIN_TILE_SIZE: u32 = 2;

/// Largest accepted tile size.
pub const MAX_TILE_SIZE: u32 = 4096;

/// Longest accepted grid update interval: ten years, in seconds.
pub const MAX_UPDATE_INTERVAL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            storage: StorageSettings {
                directory: super::file::config_directory().join(DEFAULT_STORAGE_DIR_NAME),
            },
            grid: GridSettings {
                tile_size: DEFAULT_TILE_SIZE,
                update_interval: DEFAULT_GRID_UPDATE_INTERVAL_SECS as u64,
            },
            repair: RepairSettings {
                interval: DEFAULT_REPAIR_INTERVAL_SECS,
                max_tiles: DEFAULT_REPAIR_MAX_TILES,
            },
            logging: LoggingSettings {
                directory: PathBuf::from(DEFAULT_LOG_DIR),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}
