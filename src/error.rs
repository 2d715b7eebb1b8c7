//! Error types for inbox-rules.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building tests, actions and rules from their
/// serialized form.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Unknown test type: {0}")]
    UnknownTestType(String),

    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    #[error("Unknown quantifier: {0}")]
    UnknownQuantifier(String),

    #[error("Missing type discriminator on {kind}")]
    MissingType { kind: &'static str },

    #[error("Invalid keyword '{keyword}': {reason}")]
    InvalidKeyword { keyword: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Message/label/group store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Query failed: {0}")]
    Query(String),
}

/// Errors from the external delivery backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend {backend} failed to {operation}: {reason}")]
    RequestFailed {
        backend: String,
        operation: String,
        reason: String,
    },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
