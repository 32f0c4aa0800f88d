//! Service configuration types.

use crate::compose::DEFAULT_TILE_SIZE;
use crate::config::ConfigFile;
use crate::ingest::DEFAULT_GRID_UPDATE_INTERVAL_SECS;
use crate::pyramid::{DEFAULT_REPAIR_INTERVAL_SECS, DEFAULT_REPAIR_MAX_TILES};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the map service.
///
/// # Example
///
/// ```
/// use gridmapper::service::ServiceConfig;
///
/// let config = ServiceConfig::builder("/tmp/gridmapper")
///     .tile_size(256)
///     .repair_max_tiles(100)
///     .build();
///
/// assert_eq!(config.tile_size(), 256);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Root for images and the metadata snapshot
    storage_root: PathBuf,
    /// Grid image edge length in pixels
    tile_size: u32,
    /// How long an uploaded grid image stays fresh
    update_interval: chrono::Duration,
    /// Interval between scheduled repair passes
    repair_interval: Duration,
    /// Composite budget per repair pass
    repair_max_tiles: usize,
}

impl ServiceConfig {
    /// Create a new configuration builder.
    pub fn builder(storage_root: impl Into<PathBuf>) -> ServiceConfigBuilder {
        ServiceConfigBuilder::new(storage_root.into())
    }

    /// Build a service configuration from the user's config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self::builder(config.storage.directory.clone())
            .tile_size(config.grid.tile_size)
            .update_interval(config.update_interval())
            .repair_interval(config.repair_interval())
            .repair_max_tiles(config.repair.max_tiles)
            .build()
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn update_interval(&self) -> chrono::Duration {
        self.update_interval
    }

    pub fn repair_interval(&self) -> Duration {
        self.repair_interval
    }

    pub fn repair_max_tiles(&self) -> usize {
        self.repair_max_tiles
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug, Clone)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    fn new(storage_root: PathBuf) -> Self {
        Self {
            config: ServiceConfig {
                storage_root,
                tile_size: DEFAULT_TILE_SIZE,
                update_interval: chrono::Duration::seconds(DEFAULT_GRID_UPDATE_INTERVAL_SECS),
                repair_interval: Duration::from_secs(DEFAULT_REPAIR_INTERVAL_SECS),
                repair_max_tiles: DEFAULT_REPAIR_MAX_TILES,
            },
        }
    }

    pub fn tile_size(mut self, tile_size: u32) -> Self {
        self.config.tile_size = tile_size;
        self
    }

    pub fn update_interval(mut self, interval: chrono::Duration) -> Self {
        self.config.update_interval = interval;
        self
    }

    pub fn repair_interval(mut self, interval: Duration) -> Self {
        self.config.repair_interval = interval;
        self
    }

    pub fn repair_max_tiles(mut self, max_tiles: usize) -> Self {
        self.config.repair_max_tiles = max_tiles;
        self
    }

    pub fn build(self) -> ServiceConfig {
        self.config
    }
}
