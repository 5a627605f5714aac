use thiserror::Error;

/// Errors raised while parsing domain values from their stored string form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown site mode '{0}' (expected structured or blog)")]
    UnknownMode(String),

    #[error("unknown content kind '{0}'")]
    UnknownKind(String),

    #[error("unknown header style '{0}'")]
    UnknownHeaderStyle(String),

    #[error("unknown image purpose '{0}'")]
    UnknownPurpose(String),

    #[error("invalid content hash: {0}")]
    InvalidHash(String),
}
