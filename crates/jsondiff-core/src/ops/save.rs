//! Save operation
//!
//! Origin check, JSON parse, unique id, insert. Failures come back as a
//! classified `ExError`; `SaveResponse::from_result` folds them into the two
//! messages the client understands.

use std::time::Instant;

use jsondiff_core_types::Sensitive;
use serde::{Deserialize, Serialize};

use crate::errors::{DiffError, ExErrorKind, ExResult};
use crate::id_gen::IdGenerator;
use crate::model::{DiffId, SavedDiff};
use crate::ops::DiffStore;
use crate::origin::{check_referer, OriginPolicy};
use crate::{log_op_end, log_op_error, log_op_start};

/// Client message for a rejected referer
pub const BAD_REFERER_MESSAGE: &str = "Bad referer.";

/// Client message for every other save failure
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save your diff.";

/// Inputs of a save call, already pulled out of the HTTP request
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    /// Raw `Referer` header
    pub referer: Option<String>,
    /// Raw `state_json` field, unparsed
    pub state_json: Option<Sensitive<String>>,
}

impl SaveRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_state_json(mut self, state_json: impl Into<String>) -> Self {
        self.state_json = Some(Sensitive::new(state_json.into()));
        self
    }
}

/// Body of every `/_save` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SaveResponse {
    pub fn saved(id: &DiffId) -> Self {
        Self {
            success: true,
            model_id: Some(id.to_string()),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            model_id: None,
            message: Some(message.into()),
        }
    }

    /// Map a save outcome to the client shape
    ///
    /// Only a bad origin is named; every other cause reads the same.
    pub fn from_result(result: &ExResult<DiffId>) -> Self {
        match result {
            Ok(id) => Self::saved(id),
            Err(err) if err.kind() == ExErrorKind::BadOrigin => Self::failed(BAD_REFERER_MESSAGE),
            Err(_) => Self::failed(SAVE_FAILED_MESSAGE),
        }
    }
}

/// Validate, persist and return the new diff's id
///
/// # Errors
///
/// - `BadOrigin` if the policy rejects the referer (checked first)
/// - `InvalidInput` if `state_json` is missing or not JSON
/// - `IdSpaceExhausted` if no free id turned up within the generator's bound
/// - whatever the store reports for a failed lookup or insert
pub fn save_diff(
    request: &SaveRequest,
    policy: &dyn OriginPolicy,
    ids: &IdGenerator,
    store: &dyn DiffStore,
) -> ExResult<DiffId> {
    let start = Instant::now();
    log_op_start!("save_diff");

    let result = save_inner(request, policy, ids, store);

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(id) => {
            tracing::info!("Saved state object with ID: {}", id);
            log_op_end!("save_diff", duration_ms = duration_ms, model_id = %id);
        }
        Err(err) => log_op_error!("save_diff", *err, duration_ms = duration_ms),
    }
    result
}

fn save_inner(
    request: &SaveRequest,
    policy: &dyn OriginPolicy,
    ids: &IdGenerator,
    store: &dyn DiffStore,
) -> ExResult<DiffId> {
    check_referer(policy, request.referer.as_deref())?;

    let raw = request
        .state_json
        .as_ref()
        .ok_or(DiffError::MissingStateJson)?;
    let state: serde_json::Value =
        serde_json::from_str(raw.expose()).map_err(|e| DiffError::MalformedStateJson {
            reason: e.to_string(),
        })?;

    // A concurrent save can claim the id between the check and the insert
    for _ in 0..ids.max_attempts().max(1) {
        let id = ids.generate_unique_id(store)?;
        let diff = SavedDiff::new(id, state.clone());
        match store.put(&diff) {
            Ok(()) => return Ok(diff.id().clone()),
            Err(err) if err.kind() == ExErrorKind::AlreadyExists => {
                tracing::warn!(model_id = %diff.id(), "identifier claimed before insert, retrying");
            }
            Err(err) => return Err(err),
        }
    }

    Err(DiffError::IdSpaceExhausted {
        attempts: ids.max_attempts(),
    }
    .into())
}
