// Domain errors - Error taxonomy shared by every layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Missing or malformed request fields
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Filesystem allocation or removal failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// File unreadable or not a recognized media container
    #[error("Probe failed: {0}")]
    Probe(String),

    /// Requested cuts leave nothing to keep
    #[error("Video too short to trim: duration {duration:.3}s, start cut {start:.3}s, end at {end:.3}s")]
    InfeasibleTrim { duration: f64, start: f64, end: f64 },

    /// Transcoding engine failure, carrying its diagnostic text
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Referenced session, file or archive is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Archive stream failure
    #[error("Archive error: {0}")]
    Archive(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Errors scoped to a single file of a batch; the batch skips the file and continues
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            DomainError::Probe(_) | DomainError::InfeasibleTrim { .. } | DomainError::Encode(_)
        )
    }

    /// Status code used when the error reaches a request boundary
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation(_) | DomainError::Config(_) => 400,
            DomainError::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Short machine-readable kind, used in reports and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::Storage(_) => "storage",
            DomainError::Probe(_) => "probe",
            DomainError::InfeasibleTrim { .. } => "infeasible_trim",
            DomainError::Encode(_) => "encode",
            DomainError::NotFound(_) => "not_found",
            DomainError::Archive(_) => "archive",
            DomainError::Config(_) => "config",
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Storage(err.to_string())
    }
}
