//! Service Error Taxonomy
//!
//! Every recoverable failure in the core is represented here and mapped to a
//! stable response code carried in the JSON body (`code` field). Transports
//! without native HTTP status (tool-call envelope) rely on these codes alone.

use thiserror::Error;

/// Response codes carried in the JSON body.
///
/// These mirror HTTP semantics but are transport-independent.
pub mod codes {
    pub const OK: i32 = 200;
    pub const VALIDATION_ERROR: i32 = 400;
    pub const VERIFICATION_REQUIRED: i32 = 401;
    pub const NOT_FOUND: i32 = 404;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const UPSTREAM_ERROR: i32 = 502;
}

/// Remediation actions offered with every `AuthRequired` rejection.
pub const REMEDIATION_ACTIONS: [&str; 2] = [
    "submit credential proof via the verify_identity tool",
    "contact support for manual assistance",
];

/// Service error types
///
/// All of these are recovered at the component boundary and turned into
/// structured responses; none of them terminate the process.
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    // === Caller errors ===
    #[error("invalid field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    /// Credential proof mismatch. Deliberately does not say which part of
    /// the proof was wrong.
    #[error("identity verification failed")]
    VerificationFailed,

    #[error("verification required: {reason}")]
    AuthRequired { reason: String },

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("invalid callback payload: {0}")]
    InvalidCallbackPayload(String),

    // === Escalation ===
    #[error("unknown backend status '{0}' - escalated to manual review")]
    UnknownBackendStatus(String),

    // === Infrastructure ===
    #[error("order store error: {0}")]
    Store(String),

    #[error("backend status source error: {0}")]
    Backend(String),
}

impl ServiceError {
    /// Stable body code for this error.
    pub fn code(&self) -> i32 {
        match self {
            ServiceError::Validation { .. } => codes::VALIDATION_ERROR,
            ServiceError::VerificationFailed => codes::VERIFICATION_REQUIRED,
            ServiceError::AuthRequired { .. } => codes::VERIFICATION_REQUIRED,
            ServiceError::NotFound(_) => codes::NOT_FOUND,
            ServiceError::InvalidCallbackPayload(_) => codes::VALIDATION_ERROR,
            ServiceError::UnknownBackendStatus(_) => codes::OK,
            ServiceError::Store(_) => codes::INTERNAL_ERROR,
            ServiceError::Backend(_) => codes::UPSTREAM_ERROR,
        }
    }

    /// Shorthand for a validation failure naming the first offending field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Store(e.to_string())
    }
}
