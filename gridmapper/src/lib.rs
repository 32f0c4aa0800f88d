//! Gridmapper - Grid merging and zoom pyramid maintenance for tiled maps
//!
//! Clients upload batches of fixed-size map grids. The library places each
//! batch on a map identity, merges identities that turn out to cover the
//! same area, and keeps a 2×2-composited zoom pyramid current while tiles
//! are being served.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```ignore
//! use gridmapper::service::{MapService, ServiceConfig};
//! use gridmapper::notify::NoOpNotifier;
//!
//! let service = MapService::open(ServiceConfig::builder(root).build(), Arc::new(NoOpNotifier))?;
//! let report = service.ingest(&batch)?;
//! let tile = service.get_tile(&tenant, report.map.unwrap(), Coord::ORIGIN, 7)?;
//! ```

pub mod compose;
pub mod config;
pub mod coord;
pub mod fsutil;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod notify;
pub mod pyramid;
pub mod service;
pub mod store;

/// Version of the gridmapper library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
