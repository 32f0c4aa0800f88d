//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and opening the map
//! service to reduce duplication across command handlers.

use crate::error::CliError;
use gridmapper::config::{config_file_path, ConfigFile};
use gridmapper::logging::{init_logging, LoggingGuard};
use gridmapper::notify::NoOpNotifier;
use gridmapper::service::{MapService, ServiceConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config from `config_path` (or the default path) and start logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let path = resolve_config_path(config_path);
        let config = ConfigFile::load_from(&path)?;

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        info!(config = %path.display(), "Configuration loaded");

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("gridmapper v{}", gridmapper::VERSION);
        info!("gridmapper CLI: {} command", command);
    }

    /// Open the snapshot-backed map service under the configured storage root.
    pub fn open_service(&self) -> Result<MapService, CliError> {
        let service_config = ServiceConfig::from_config_file(&self.config);
        MapService::open(service_config, Arc::new(NoOpNotifier))
            .map_err(CliError::ServiceCreation)
            .inspect(|_| info!("Map service opened"))
    }

    /// Write the service's metadata snapshot back to disk.
    pub fn persist(&self, service: &MapService) -> Result<(), CliError> {
        service.persist()?;
        Ok(())
    }
}

/// Config file to use: the `--config` flag, else `~/.gridmapper/config.ini`.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}
