//! Shared error type across mcstats crates.

use std::io;

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Metric type code did not resolve to a known kind.
    UnsupportedMetricType,
    /// Request body could not be decoded.
    BadRequest,
    /// Downstream collector could not be reached.
    Transport,
    /// Invalid configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::UnsupportedMetricType => "UNSUPPORTED_METRIC_TYPE",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Transport => "TRANSPORT",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status surfaced to the caller.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::UnsupportedMetricType => 415,
            ClientCode::BadRequest => 400,
            ClientCode::Transport | ClientCode::Config | ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("unsupported metric type: {0:?}")]
    UnsupportedMetricType(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("transport: {0}")]
    Transport(#[from] io::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::UnsupportedMetricType(_) => ClientCode::UnsupportedMetricType,
            RelayError::BadRequest(_) => ClientCode::BadRequest,
            RelayError::Transport(_) => ClientCode::Transport,
            RelayError::Config(_) => ClientCode::Config,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }
}
