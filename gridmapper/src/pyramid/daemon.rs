//! Repair scheduler daemon.
//!
//! Runs [`PyramidRebuilder::repair`] on a fixed interval so pyramids left
//! stale by crashed or overlapping rebuilds converge without operator
//! action. Each pass runs on the blocking thread pool.
//!
//! # Example
//!
//! ```ignore
//! use gridmapper::pyramid::RepairDaemon;
//!
//! let daemon = RepairDaemon::new(rebuilder).with_max_tiles(1000);
//! tokio::spawn(daemon.run(shutdown_token));
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::pyramid::rebuilder::PyramidRebuilder;
use crate::pyramid::types::RepairStats;

/// Default interval between repair passes (5 minutes).
pub const DEFAULT_REPAIR_INTERVAL_SECS: u64 = 300;

/// Default composite budget per pass.
pub const DEFAULT_REPAIR_MAX_TILES: usize = 5000;

/// Background daemon that periodically runs the repair pass.
pub struct RepairDaemon {
    rebuilder: PyramidRebuilder,

    /// Interval between passes.
    interval: Duration,

    /// Composite budget per pass.
    max_tiles: usize,
}

impl RepairDaemon {
    /// Creates a repair daemon with default settings.
    pub fn new(rebuilder: PyramidRebuilder) -> Self {
        Self {
            rebuilder,
            interval: Duration::from_secs(DEFAULT_REPAIR_INTERVAL_SECS),
            max_tiles: DEFAULT_REPAIR_MAX_TILES,
        }
    }

    /// Sets a custom interval between passes.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the composite budget per pass.
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_tiles(&self) -> usize {
        self.max_tiles
    }

    /// Runs a single pass on the blocking pool.
    ///
    /// Returns `None` if the pass failed; failures are logged and the next
    /// scheduled pass retries.
    pub async fn run_once(&self, shutdown: &CancellationToken) -> Option<RepairStats> {
        let rebuilder = self.rebuilder.clone();
        let max_tiles = self.max_tiles;
        let cancel = shutdown.clone();

        match tokio::task::spawn_blocking(move || rebuilder.repair(max_tiles, &cancel)).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                warn!(error = %e, "Repair pass failed");
                None
            }
            Err(e) => {
                error!(error = %e, "Repair pass task panicked");
                None
            }
        }
    }

    /// Runs the scheduler until shutdown is signalled.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            max_tiles = self.max_tiles,
            "Repair daemon starting"
        );

        let mut interval = tokio::time::interval(self.interval);
        // Skip the first immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Repair daemon shutting down");
                    break;
                }

                _ = interval.tick() => {
                    if let Some(stats) = self.run_once(&shutdown).await {
                        if stats.exhausted {
                            debug!(
                                repaired = stats.tiles_repaired,
                                "Repair budget exhausted, continuing next pass"
                            );
                        }
                    }
                }
            }
        }
    }
}
