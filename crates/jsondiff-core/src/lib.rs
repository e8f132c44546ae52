//! jsondiff core - domain kernel for the saved-diff service
//!
//! This crate holds everything that does not touch HTTP or SQL:
//! - `SavedDiff` model and `DiffId` identifier type
//! - Bounded, injectable identifier generation
//! - Referer-based origin policy
//! - The `DiffStore` persistence seam and an in-memory implementation
//! - Save/load operations and the client-visible save response shape
//! - JSON embedding and HTML page rendering
//! - Error and logging facilities shared by the other crates

pub mod errors;
pub mod id_gen;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod origin;
pub mod render;

// The logging macros expand to paths under this re-export
pub use jsondiff_core_types as core_types;

// Re-export commonly used types
pub use errors::{DiffError, ExError, ExErrorKind, ExResult, Result};
pub use id_gen::{IdGenerator, RandomSource, SequenceSource, ThreadRngSource};
pub use model::{DiffId, SavedDiff};
pub use ops::{DiffStore, MemoryStore, SaveRequest, SaveResponse};
pub use origin::{AllowListPolicy, OriginPolicy, OriginRule};
pub use render::{PageContext, PageRenderer};
