//! Configuration for the grid mapper.
//!
//! Settings are read from an INI file (default `~/.gridmapper/config.ini`),
//! overlaying [`ConfigFile::default`] with any values present.
//!
//! # Example
//!
//! ```
//! use gridmapper::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.grid.tile_size, 100);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError, METADATA_FILE_NAME};
pub use settings::{ConfigFile, GridSettings, LoggingSettings, RepairSettings, StorageSettings};
