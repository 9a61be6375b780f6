use thiserror::Error;

/// Errors emitted while producing rows.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<fakeset_core::Error> for GenerationError {
    fn from(err: fakeset_core::Error) -> Self {
        match err {
            fakeset_core::Error::UnknownColumnType(tag) => Self::UnknownColumnType(tag),
            other => Self::InvalidSchema(other.to_string()),
        }
    }
}
