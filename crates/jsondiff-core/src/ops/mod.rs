//! Operations on saved diffs
//!
//! `store` defines the persistence seam; `save` and `load` are the two
//! operations the HTTP layer exposes.

pub mod load;
pub mod save;
pub mod store;

pub use load::{load_diff, resolve_page_state};
pub use save::{save_diff, SaveRequest, SaveResponse, BAD_REFERER_MESSAGE, SAVE_FAILED_MESSAGE};
pub use store::{DiffStore, MemoryStore};
