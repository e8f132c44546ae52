//! Canonical schema constants for structured logging
//!
//! Every log line emitted through the `log_op_*` macros uses these keys, so
//! production JSON logs can be queried by a fixed vocabulary.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_MODEL_ID: &str = "model_id";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// HTTP header carrying the request id in both directions
pub const HEADER_REQUEST_ID: &str = "x-request-id";
