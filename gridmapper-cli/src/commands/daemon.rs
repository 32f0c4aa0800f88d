//! Daemon command - run scheduled repair passes until Ctrl-C.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the daemon command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("daemon");

    let service = runner.open_service()?;
    let daemon = service.repair_daemon();
    let shutdown = CancellationToken::new();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    println!(
        "Repair daemon running every {}s (budget {} tiles). Press Ctrl-C to stop.",
        daemon.interval().as_secs(),
        daemon.max_tiles()
    );

    runtime.block_on(async {
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received, stopping"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, stopping"),
            }
            signal_token.cancel();
        });

        daemon.run(shutdown).await;
    });

    runner.persist(&service)?;
    println!("Repair daemon stopped.");
    Ok(())
}
