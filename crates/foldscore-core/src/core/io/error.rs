use thiserror::Error;

/// Rejection of a submitted payload. Raised before any state is created or
/// mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Malformed or inconsistent payload structure.
    #[error("Schema error: {0}")]
    Schema(String),
    /// Well-formed payload describing physically impossible geometry.
    #[error("Geometry error: {0}")]
    Geometry(String),
}

impl From<serde_json::Error> for PayloadError {
    fn from(e: serde_json::Error) -> Self {
        PayloadError::Schema(e.to_string())
    }
}
