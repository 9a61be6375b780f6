use thiserror::Error;

/// Core error type shared across Fakeset crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema violates structural invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// A column references a type outside the registry.
    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),
    /// A schema document failed JSON Schema validation.
    #[error("invalid schema document: {0}")]
    InvalidDocument(String),
    /// An identifier could not be parsed.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// An illegal dataset status transition was requested.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by Fakeset crates.
pub type Result<T> = std::result::Result<T, Error>;
