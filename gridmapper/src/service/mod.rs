//! High-level service facade for map operations.
//!
//! This module provides a simplified API that encapsulates all component
//! wiring and configuration, following the Facade pattern. It is also the
//! boundary where the exposed zoom numbering is converted to the internal
//! one.

mod config;
mod error;
mod facade;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::ServiceError;
pub use facade::{MapService, TileBlob};
