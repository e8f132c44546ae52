//! jsondiff store - SQLite persistence for saved diffs
//!
//! Provides:
//! - Connection management
//! - Embedded, checksummed schema migrations
//! - `SqliteDiffStore`, the durable `DiffStore` implementation

pub mod db;
pub mod errors;
pub mod migrations;
pub mod sqlite_store;

pub use errors::Result;
pub use sqlite_store::SqliteDiffStore;
