use prospectflow_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for boundary layers (engine, API) using ExError
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that is logged, asserted in tests
/// and returned to HTTP callers. The HTTP layer derives status codes from
/// the kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    ValidationFailed,
    MissingId,

    // Lookup
    NotFound,

    // Referential integrity
    /// A Client already references the Prospect
    AlreadyConverted,
    /// The Prospect cannot be deleted while a Client references it
    ProspectHasClient,
    /// Unique constraint on Prospect email
    DuplicateEmail,
    /// The Client disappeared between lookup and delete
    DeleteRaceLost,
    /// Non-fatal cross-document inconsistency; logged, never returned
    IntegrityWarning,

    // Integration/IO
    StoreFailure,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ValidationFailed => "ERR_VALIDATION_FAILED",
            ExErrorKind::MissingId => "ERR_MISSING_ID",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyConverted => "ERR_ALREADY_CONVERTED",
            ExErrorKind::ProspectHasClient => "ERR_PROSPECT_HAS_CLIENT",
            ExErrorKind::DuplicateEmail => "ERR_DUPLICATE_EMAIL",
            ExErrorKind::DeleteRaceLost => "ERR_DELETE_RACE_LOST",
            ExErrorKind::IntegrityWarning => "ERR_INTEGRITY_WARNING",
            ExErrorKind::StoreFailure => "ERR_STORE_FAILURE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) for programmatic handling plus
/// optional context for debugging. Built from `PipelineError` at the
/// engine boundary.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    field: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            field: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the offending payload field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
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

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// User-facing message
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
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for pipeline operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    // ===== Validation =====
    /// Payload rejected by an entity schema
    #[error("Validation failed on '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// `?id=` missing on an update or delete
    #[error("{resource} id is required")]
    MissingId { resource: String },

    // ===== Lookup =====
    #[error("Prospect not found: {prospect_id}")]
    ProspectNotFound { prospect_id: String },

    #[error("Client not found: {client_id}")]
    ClientNotFound { client_id: String },

    #[error("Interaction not found: {interaction_id}")]
    InteractionNotFound { interaction_id: String },

    // ===== Referential integrity =====
    /// A Client already exists for this Prospect
    #[error("Prospect {prospect_id} has already been converted to a client")]
    AlreadyConverted { prospect_id: String },

    /// Deleting the Prospect would orphan its Client
    #[error("Prospect {prospect_id} is referenced by client {client_id}")]
    ProspectHasClient {
        prospect_id: String,
        client_id: String,
    },

    /// Prospect email is already taken
    #[error("Email already in use: {email}")]
    DuplicateEmail { email: String },

    /// The Client was found but the delete removed nothing
    #[error("Client {client_id} was removed by a concurrent request")]
    DeleteRaceLost { client_id: String },

    // ===== Integration =====
    /// Any failure reported by the entity store
    #[error("Store failure during {op}: {message}")]
    Store { op: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PipelineError {
    /// Shorthand for a schema violation on one field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a store failure
    pub fn store(op: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Store {
            op: op.into(),
            message: message.into(),
        }
    }
}

impl From<PipelineError> for ExError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ValidationFailed { field, reason } => {
                ExError::new(ExErrorKind::ValidationFailed)
                    .with_message(format!("\"{}\" {}", field, reason))
                    .with_field(field)
            }

            PipelineError::MissingId { resource } => ExError::new(ExErrorKind::MissingId)
                .with_message(format!("{} id is required", resource)),

            PipelineError::ProspectNotFound { prospect_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(prospect_id)
                    .with_message("Prospect not found")
            }

            PipelineError::ClientNotFound { client_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(client_id)
                .with_message("Client not found"),

            PipelineError::InteractionNotFound { interaction_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(interaction_id)
                    .with_message("Interaction not found")
            }

            PipelineError::AlreadyConverted { prospect_id } => {
                ExError::new(ExErrorKind::AlreadyConverted)
                    .with_entity_id(prospect_id)
                    .with_message("This prospect has already been converted to a client")
            }

            PipelineError::ProspectHasClient {
                prospect_id,
                client_id,
            } => ExError::new(ExErrorKind::ProspectHasClient)
                .with_entity_id(prospect_id)
                .with_message(format!(
                    "Prospect is referenced by client {}; delete the client first",
                    client_id
                )),

            PipelineError::DuplicateEmail { email: _ } => {
                ExError::new(ExErrorKind::DuplicateEmail)
                    .with_field("email")
                    .with_message("Email already in use")
            }

            PipelineError::DeleteRaceLost { client_id } => {
                ExError::new(ExErrorKind::DeleteRaceLost)
                    .with_entity_id(client_id)
                    .with_message("Client could not be deleted")
            }

            PipelineError::Store { op, message } => ExError::new(ExErrorKind::StoreFailure)
                .with_op(op)
                .with_message(message),

            PipelineError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            PipelineError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization {
            message: err.to_string(),
        }
    }
}
