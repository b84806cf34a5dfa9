//! Error types for change record serialization
//!
//! Rendering a change record never fails. Errors only come from the edges:
//! decoding pgoutput input, resolving relations, loading configuration and
//! writing finished records to a sink.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "postgres")]
use crate::postgres::protocol::DecodeError;

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Replication protocol errors (malformed pgoutput)
    Protocol,
    /// Relation metadata errors (unknown relation id)
    Schema,
    /// Configuration errors (invalid settings)
    Configuration,
    /// Output sink errors (I/O, closed channel)
    Output,
    /// Serialization errors (JSON, YAML)
    Serialization,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Schema => "schema",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Output => "output",
            ErrorCategory::Serialization => "serialization",
            ErrorCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised around the change record serializer.
#[derive(Error, Debug)]
pub enum DecodingError {
    /// Malformed pgoutput message
    #[cfg(feature = "postgres")]
    #[error("Protocol error: {0}")]
    Protocol(#[from] DecodeError),

    /// A row change referenced a relation that was never announced
    #[error("Unknown relation: {0}")]
    UnknownRelation(u32),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink rejected a record
    #[error("Sink error: {0}")]
    Sink(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DecodingError {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a sink error
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Get the error category for metrics and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            #[cfg(feature = "postgres")]
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::UnknownRelation(_) => ErrorCategory::Schema,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Yaml(_) => ErrorCategory::Configuration,
            Self::Json(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Output,
            Self::Sink(_) => ErrorCategory::Output,
            Self::InvalidState(_) => ErrorCategory::Other,
            Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            #[cfg(feature = "postgres")]
            Self::Protocol(_) => "protocol_error",
            Self::UnknownRelation(_) => "unknown_relation",
            Self::Config(_) => "config_error",
            Self::Yaml(_) => "yaml_error",
            Self::Json(_) => "json_error",
            Self::Io(_) => "io_error",
            Self::Sink(_) => "sink_error",
            Self::InvalidState(_) => "invalid_state",
            Self::Other(_) => "unknown",
        }
    }
}

/// Result type for change record serialization
pub type Result<T> = std::result::Result<T, DecodingError>;
