// SPDX-License-Identifier: Apache-2.0

use crate::parse_error::ParseError;

/// The underlying fetch could not complete.
#[derive(Debug)]
pub struct TransportError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Discriminant of a [`FeedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TransportFailed,
    UnsuccessfulResponse,
    MalformedInput,
    SchemaViolation,
    TypeMismatch,
}

/// Failure of a fetch or decode.
#[derive(Debug)]
pub enum FeedError {
    /// The request never produced a response.
    TransportFailed(TransportError),
    /// A response arrived with a non-success status; its body was not decoded.
    UnsuccessfulResponse { status: u16 },
    /// The body is not well-formed JSON.
    MalformedInput(ParseError),
    /// Well-formed JSON that does not have the expected structure.
    SchemaViolation {
        expected: &'static str,
        offset: usize,
    },
    /// A scalar could not be coerced to its field's type.
    TypeMismatch { field: &'static str, offset: usize },
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::TransportFailed(_) => ErrorKind::TransportFailed,
            FeedError::UnsuccessfulResponse { .. } => ErrorKind::UnsuccessfulResponse,
            FeedError::MalformedInput(_) => ErrorKind::MalformedInput,
            FeedError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            FeedError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }
}

impl From<ParseError> for FeedError {
    fn from(err: ParseError) -> Self {
        FeedError::MalformedInput(err)
    }
}

impl From<TransportError> for FeedError {
    fn from(err: TransportError) -> Self {
        FeedError::TransportFailed(err)
    }
}

impl core::fmt::Display for FeedError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FeedError::TransportFailed(e) => write!(f, "transport failed: {e}"),
            FeedError::UnsuccessfulResponse { status } => {
                write!(f, "unsuccessful response: HTTP status {status}")
            }
            FeedError::MalformedInput(e) => write!(f, "malformed input: {e}"),
            FeedError::SchemaViolation { expected, offset } => {
                write!(f, "schema violation: expected {expected} at byte {offset}")
            }
            FeedError::TypeMismatch { field, offset } => {
                write!(f, "type mismatch: field `{field}` at byte {offset}")
            }
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::TransportFailed(e) => Some(e),
            FeedError::MalformedInput(e) => Some(e),
            _ => None,
        }
    }
}
