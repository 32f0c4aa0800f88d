//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[storage]
; Root directory for grid images, composited tiles and metadata.json
directory = {}

[grid]
; Edge length of uploaded grid images in pixels (default: 100)
; Must be even; uploads of any other size are rejected
tile_size = {}
; Seconds before a client is asked to upload a grid image again (default: 1800)
update_interval = {}

[repair]
; Seconds between scheduled repair passes in daemon mode (default: 300)
interval = {}
; Maximum parent tiles recomposited per pass (default: 5000)
; 0 disables repair work entirely
max_tiles = {}

[logging]
; Directory for log files (default: logs)
directory = {}
; Log file name (default: gridmapper.log)
file = {}
"#,
        path_to_string(&config.storage.directory),
        config.grid.tile_size,
        config.grid.update_interval,
        config.repair.interval,
        config.repair.max_tiles,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
