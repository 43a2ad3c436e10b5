//! Transport error type

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unsupported response content type '{0}'")]
    UnsupportedContentType(String),

    #[error("JSON-RPC message could not be encoded or decoded: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
