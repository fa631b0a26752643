//! Error types for csvhealth core.

use std::{error::Error, fmt, io};

use crate::schema::SchemaError;

/// Error type for csvhealth core operations.
#[derive(Debug)]
pub enum CsvHealthError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for CsvHealthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CsvHealthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Other(_) => None,
        }
    }
}

impl From<io::Error> for CsvHealthError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Convenience result type for csvhealth core.
pub type Result<T> = std::result::Result<T, CsvHealthError>;

/// Failure of a single analysis request.
///
/// Both variants surface to the user as the same notification; the split
/// exists so logs can tell a broken endpoint from a malformed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The endpoint could not be reached, timed out, or answered with a
    /// non-success status. `status` is `None` when no response arrived.
    Transport {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Short description of the failure.
        reason: String,
    },
    /// The endpoint answered successfully but the body is not a valid
    /// analysis result.
    InvalidResponse(SchemaError),
}

impl AnalysisError {
    /// Build a transport error for a non-success HTTP status.
    pub fn status(code: u16) -> Self {
        Self::Transport {
            status: Some(code),
            reason: format!("analysis endpoint returned status {code}"),
        }
    }

    /// Build a transport error for a request that never produced a response.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            reason: reason.into(),
        }
    }

    /// Short label used when logging the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason, .. } => write!(f, "transport error: {reason}"),
            Self::InvalidResponse(err) => write!(f, "invalid analysis response: {err}"),
        }
    }
}

impl Error for AnalysisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport { .. } => None,
            Self::InvalidResponse(err) => Some(err),
        }
    }
}

impl From<SchemaError> for AnalysisError {
    fn from(value: SchemaError) -> Self {
        Self::InvalidResponse(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisError, CsvHealthError};
    use crate::schema::{SchemaError, SchemaIssue};
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = CsvHealthError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
    }

    #[test]
    fn other_error_formats_message() {
        let error = CsvHealthError::Other("csvhealth failed".to_string());
        assert_eq!(format!("{error}"), "csvhealth failed");
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: CsvHealthError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            CsvHealthError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn status_error_carries_code() {
        let error = AnalysisError::status(500);
        assert_eq!(
            error,
            AnalysisError::Transport {
                status: Some(500),
                reason: "analysis endpoint returned status 500".to_string(),
            }
        );
        assert_eq!(error.kind(), "transport");
        assert!(error.to_string().contains("500"));
    }

    #[test]
    fn invalid_response_wraps_schema_error() {
        let issue = SchemaIssue::missing("$.metricas", "object");
        let schema = SchemaError::new(vec![issue]);
        let error: AnalysisError = schema.clone().into();
        assert_eq!(error.kind(), "invalid_response");
        assert_eq!(error, AnalysisError::InvalidResponse(schema));
        assert!(error.to_string().contains("$.metricas"));
    }
}
