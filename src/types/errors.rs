//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. `ErrorKind` is the wire-level taxonomy
//! shared by tool results, backend outcomes and health evidence.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy reported inside tool results and probe evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or malformed credentials / endpoints.
    #[serde(rename = "ConfigurationError")]
    Configuration,
    /// Dispatch to a tool name that is not registered.
    #[serde(rename = "UnknownToolError")]
    UnknownTool,
    /// Arguments fail the schema or a cross-field rule; also backend 400/422.
    #[serde(rename = "ValidationError")]
    Validation,
    /// Backend 401.
    #[serde(rename = "AuthenticationError")]
    Authentication,
    /// Backend 403.
    #[serde(rename = "PermissionError")]
    Permission,
    /// Backend 404.
    #[serde(rename = "NotFoundError")]
    NotFound,
    /// Timeout, DNS or connection failure.
    #[serde(rename = "TransportError")]
    Transport,
    /// Any other non-2xx status, or a 2xx body of the wrong shape.
    #[serde(rename = "UnexpectedStatus")]
    UnexpectedStatus,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::UnknownTool => "UnknownToolError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Permission => "PermissionError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::UnexpectedStatus => "UnexpectedStatus",
        }
    }

    /// Classify a backend HTTP status. `None` means success (any 2xx).
    pub fn from_http_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 => Some(ErrorKind::Authentication),
            403 => Some(ErrorKind::Permission),
            404 => Some(ErrorKind::NotFound),
            400 | 422 => Some(ErrorKind::Validation),
            _ => Some(ErrorKind::UnexpectedStatus),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error enum for the non-dispatch code paths.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing required credentials or endpoints (fatal at startup).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Tool name not present in the catalogue.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Validation errors (schema or cross-field rules).
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map onto the wire taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::UnknownTool(_) => ErrorKind::UnknownTool,
            Error::Validation(_) | Error::Serialization(_) => ErrorKind::Validation,
            Error::Io(_) => ErrorKind::Transport,
        }
    }

    /// Message without the kind prefix, for result envelopes.
    pub fn message(&self) -> String {
        match self {
            Error::Configuration(msg) | Error::UnknownTool(msg) | Error::Validation(msg) => {
                msg.clone()
            }
            Error::Serialization(e) => e.to_string(),
            Error::Io(e) => e.to_string(),
        }
    }
}

// Convenience constructors
impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unknown_tool(msg: impl Into<String>) -> Self {
        Self::UnknownTool(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
