//! Error types
//!
//! `RouterError` covers mistakes in route declarations and is meant to halt
//! startup. `HandlerError` is what a handler (or the JSON helper) returns at
//! request time; the router passes it through untouched.

use hyper::StatusCode;
use thiserror::Error;

/// Configuration errors raised while building a router.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Route pattern does not start with `/`.
    #[error("route pattern must start with '/': {0:?}")]
    InvalidPattern(String),

    /// Method name outside GET, POST, PUT, DELETE, PATCH.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Errors surfaced by handlers and the request pipeline.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Response body could not be encoded as JSON.
    #[error("failed to encode JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Response could not be assembled.
    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),

    /// Request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),

    /// Request body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// Handler-defined failure with the status it would like reported.
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
}

impl HandlerError {
    /// Shorthand for a handler-defined failure.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Status code the transport should report for this error.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Json(_) | Self::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
