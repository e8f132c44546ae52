use jsondiff_core_types::RequestId;
use thiserror::Error;

/// Result type alias using DiffError
pub type Result<T> = std::result::Result<T, DiffError>;

/// Result type alias using the structured ExError
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure in the service is classified into one of these kinds. Each
/// kind maps to a stable error code that shows up in logs as `err_code` and
/// is what tests assert against. Clients never see these codes; the save
/// endpoint collapses them into its two public messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Request validation
    InvalidInput,
    BadOrigin,

    // Identity
    AlreadyExists,
    IdSpaceExhausted,

    // Integration/IO
    Serialization,
    Persistence,
    Render,
    Config,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::BadOrigin => "ERR_BAD_ORIGIN",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::IdSpaceExhausted => "ERR_ID_SPACE_EXHAUSTED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Render => "ERR_RENDER",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for kinds caused by the request itself rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExErrorKind::InvalidInput | ExErrorKind::BadOrigin)
    }
}

/// Canonical structured error type
///
/// Carries the classification plus enough context (operation, model id,
/// request id) to make a log line actionable.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (a model id for this service)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (model_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for diff operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    /// Referer header absent or not on the allow-list
    #[error("Referer not allowed: {}", referer.as_deref().unwrap_or("<none>"))]
    BadReferer { referer: Option<String> },

    /// Save request carried no `state_json` field
    #[error("Missing state_json field")]
    MissingStateJson,

    /// `state_json` is not valid JSON text
    #[error("Malformed state_json: {reason}")]
    MalformedStateJson { reason: String },

    /// Identifier is too short to ever name a saved diff
    #[error("Invalid model id {model_id:?}: {reason}")]
    InvalidDiffId { model_id: String, reason: String },

    /// A saved diff already occupies this identifier
    #[error("Saved diff already exists: {model_id}")]
    DiffAlreadyExists { model_id: String },

    /// Every candidate identifier drawn collided with an existing record
    #[error("No free identifier after {attempts} attempts")]
    IdSpaceExhausted { attempts: u32 },

    /// Stored JSON could not be re-serialized
    #[error("Failed to serialize state: {reason}")]
    Serialization { reason: String },

    /// Template rendering failed
    #[error("Failed to render page: {reason}")]
    Render { reason: String },

    /// An origin rule or other setting could not be parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<DiffError> for ExError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::BadReferer { referer } => {
                let err = ExError::new(ExErrorKind::BadOrigin);
                match referer {
                    Some(r) => err.with_message(format!("Bad referer: {}", r)),
                    None => err.with_message("Bad referer: header missing"),
                }
            }
            DiffError::MissingStateJson => ExError::new(ExErrorKind::InvalidInput)
                .with_message("state_json field is missing"),
            DiffError::MalformedStateJson { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("state_json is not valid JSON: {}", reason)),
            DiffError::InvalidDiffId { model_id, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_id(model_id)
                    .with_message(reason)
            }
            DiffError::DiffAlreadyExists { model_id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity_id(model_id)
                    .with_message("Saved diff already exists")
            }
            DiffError::IdSpaceExhausted { attempts } => {
                ExError::new(ExErrorKind::IdSpaceExhausted)
                    .with_message(format!("No free identifier after {} attempts", attempts))
            }
            DiffError::Serialization { reason } => {
                ExError::new(ExErrorKind::Serialization).with_message(reason)
            }
            DiffError::Render { reason } => ExError::new(ExErrorKind::Render).with_message(reason),
            DiffError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::Config).with_message(reason)
            }
        }
    }
}
