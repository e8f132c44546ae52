//! Core types shared across the jsondiff crates
//!
//! This crate provides foundational types used by the error, logging and
//! HTTP layers:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Sensitive data**: Sensitive<T> marker for client payloads that must not be logged
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId};
pub use sensitive::Sensitive;
