//! Map identity merging.

mod engine;
mod types;

pub use engine::MergeEngine;
pub use types::{MergeError, MergeOutcome};
