//! Domain models

pub mod saved_diff;

pub use saved_diff::{DiffId, SavedDiff};
