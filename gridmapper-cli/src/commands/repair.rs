//! Repair command - run one bounded pyramid repair pass.

use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the repair command.
///
/// `max_tiles` overrides the configured per-pass budget.
pub fn run(runner: &CliRunner, max_tiles: Option<usize>) -> Result<(), CliError> {
    runner.log_startup("repair");

    let budget = max_tiles.unwrap_or(runner.config().repair.max_tiles);
    let service = runner.open_service()?;
    let stats = service.repair(budget, &CancellationToken::new())?;
    runner.persist(&service)?;

    println!("Maps scanned:   {}", stats.maps_scanned);
    println!("Tiles repaired: {}", stats.tiles_repaired);
    if stats.exhausted {
        println!("Budget of {} tiles exhausted; run again to continue.", budget);
    }
    Ok(())
}
