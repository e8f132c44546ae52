//! Load operation
//!
//! Reads never fail from the client's point of view: an unknown id, a store
//! error and a missing id all render the empty state. The distinction only
//! shows up in the logs.

use std::time::Instant;

use crate::errors::ExResult;
use crate::model::{DiffId, SavedDiff};
use crate::ops::DiffStore;
use crate::render::{embed_json, EMPTY_STATE_LITERAL};
use crate::{log_op_end, log_op_error, log_op_start};

/// Fetch a saved diff, `None` when the id is unknown
///
/// # Errors
///
/// Propagates store failures.
pub fn load_diff(id: &DiffId, store: &dyn DiffStore) -> ExResult<Option<SavedDiff>> {
    let start = Instant::now();
    log_op_start!("load_diff", model_id = %id);

    let result = store.get(id);

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(found) => {
            log_op_end!("load_diff", duration_ms = duration_ms, found = found.is_some());
        }
        Err(err) => log_op_error!("load_diff", *err, duration_ms = duration_ms, model_id = %id),
    }
    result
}

/// Produce the literal to embed in the page for an optional id
///
/// Returns `EMPTY_STATE_LITERAL` when there is no id, the id is unknown, or
/// anything goes wrong loading or re-serializing the stored state.
pub fn resolve_page_state(id: Option<&DiffId>, store: &dyn DiffStore) -> String {
    let Some(id) = id else {
        return EMPTY_STATE_LITERAL.to_string();
    };

    match load_diff(id, store) {
        Ok(Some(diff)) => match embed_json(diff.state()) {
            Ok(literal) => literal,
            Err(err) => {
                tracing::warn!(model_id = %id, error = %err, "stored state not embeddable, rendering empty state");
                EMPTY_STATE_LITERAL.to_string()
            }
        },
        Ok(None) => {
            tracing::debug!(model_id = %id, "unknown model id, rendering empty state");
            EMPTY_STATE_LITERAL.to_string()
        }
        Err(err) => {
            tracing::warn!(model_id = %id, error = %err, "load failed, rendering empty state");
            EMPTY_STATE_LITERAL.to_string()
        }
    }
}
