//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{MAX_TILE_SIZE, MAX_UPDATE_INTERVAL_SECS, MIN_TILE_SIZE};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [storage] section
    if let Some(section) = ini.section(Some("storage")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.storage.directory = expand_tilde(v);
            }
        }
    }

    // [grid] section
    if let Some(section) = ini.section(Some("grid")) {
        if let Some(v) = section.get("tile_size") {
            let size: u32 = parse_number("grid", "tile_size", v, "must be a positive integer")?;
            if !(MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&size) || size % 2 != 0 {
                return Err(invalid(
                    "grid",
                    "tile_size",
                    v,
                    &format!(
                        "must be an even number between {} and {}",
                        MIN_TILE_SIZE, MAX_TILE_SIZE
                    ),
                ));
            }
            config.grid.tile_size = size;
        }
        if let Some(v) = section.get("update_interval") {
            let secs: u64 =
                parse_number("grid", "update_interval", v, "must be a positive integer (seconds)")?;
            if secs > MAX_UPDATE_INTERVAL_SECS {
                return Err(invalid(
                    "grid",
                    "update_interval",
                    v,
                    &format!("must be at most {} seconds", MAX_UPDATE_INTERVAL_SECS),
                ));
            }
            config.grid.update_interval = secs;
        }
    }

    // [repair] section
    if let Some(section) = ini.section(Some("repair")) {
        if let Some(v) = section.get("interval") {
            let secs: u64 =
                parse_number("repair", "interval", v, "must be a positive integer (seconds)")?;
            if secs == 0 {
                return Err(invalid("repair", "interval", v, "must be at least 1 second"));
            }
            config.repair.interval = secs;
        }
        if let Some(v) = section.get("max_tiles") {
            config.repair.max_tiles =
                parse_number("repair", "max_tiles", v, "must be a non-negative integer")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::config::settings::ConfigFile;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[storage]
directory = /srv/gridmapper

[repair]
max_tiles = 250
"#,
        )
        .unwrap();

        // Specified values
        assert_eq!(config.storage.directory, PathBuf::from("/srv/gridmapper"));
        assert_eq!(config.repair.max_tiles, 250);

        // Default values
        assert_eq!(config.grid.tile_size, crate::compose::DEFAULT_TILE_SIZE);
        assert_eq!(config.logging.file, DEFAULT_LOG_FILE);
    }

    #[test]
    fn test_invalid_number() {
        let err = load(
            r#"
[grid]
update_interval = soon
"#,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "update_interval"
        ));
        assert!(err.to_string().contains("grid.update_interval"));
    }

    #[test]
    fn test_update_interval_upper_bound() {
        let config = load(&format!("[grid]\nupdate_interval = {}\n", MAX_UPDATE_INTERVAL_SECS))
            .unwrap();
        assert_eq!(config.grid.update_interval, MAX_UPDATE_INTERVAL_SECS);

        let err = load("[grid]\nupdate_interval = 18446744073709551615\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "update_interval"
        ));
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_odd_tile_size_rejected() {
        let err = load("[grid]\ntile_size = 101\n").unwrap_err();
        assert!(err.to_string().contains("even number"));
    }

    #[test]
    fn test_zero_repair_interval_rejected() {
        assert!(load("[repair]\ninterval = 0\n").is_err());
    }

    #[test]
    fn test_zero_max_tiles_allowed() {
        let config = load("[repair]\nmax_tiles = 0\n").unwrap();
        assert_eq!(config.repair.max_tiles, 0);
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = load("[storage]\ndirectory =\n[logging]\nfile =\n").unwrap();
        let default = ConfigFile::default();
        assert_eq!(config.storage.directory, default.storage.directory);
        assert_eq!(config.logging.file, default.logging.file);
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        // Non-tilde paths should be unchanged
        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
