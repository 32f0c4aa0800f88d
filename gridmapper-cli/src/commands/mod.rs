//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`daemon`] - Run the repair daemon until interrupted
//! - [`ingest`] - Place an upload batch from a batch file
//! - [`init`] - Configuration initialization
//! - [`maps`] - List a tenant's maps
//! - [`repair`] - Run one bounded repair pass
//! - [`tile`] - Export a single tile to a file

pub mod daemon;
pub mod ingest;
pub mod init;
pub mod maps;
pub mod repair;
pub mod tile;
