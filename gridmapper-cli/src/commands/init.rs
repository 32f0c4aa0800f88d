//! Init-config command - write the default configuration file.

use std::path::Path;

use gridmapper::config::ConfigFile;

use crate::error::CliError;
use crate::runner::resolve_config_path;

/// Run the init-config command.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = resolve_config_path(config_path);

    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
