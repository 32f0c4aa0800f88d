//! Maps command - list a tenant's maps.

use super::ingest::parse_tenant;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the maps command.
pub fn run(runner: &CliRunner, tenant: &str) -> Result<(), CliError> {
    let tenant = parse_tenant(tenant)?;
    let service = runner.open_service()?;
    let maps = service.list_maps(&tenant)?;

    if maps.is_empty() {
        println!("No maps for tenant '{}'", tenant);
        return Ok(());
    }

    println!("{:<6} {:<24} {:<8} CREATED", "ID", "NAME", "HIDDEN");
    for map in maps {
        println!(
            "{:<6} {:<24} {:<8} {}",
            map.id.0,
            map.name,
            if map.hidden { "yes" } else { "no" },
            map.created.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
