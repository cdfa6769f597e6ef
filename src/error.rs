//! Error types for corsproxy.
//!
//! [`ProxyError`] covers startup and CLI failures and is surfaced by
//! `main`. [`ForwardError`] covers the per-request failures of the
//! forwarding handler; it renders itself as the JSON error envelope
//! with the CORS header set attached, so a browser caller can always
//! read the failure.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::proxy::headers::apply_cors;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid proxy path '{0}': must start with '/', contain no ':', '{{' or '}}', and differ from /health")]
    InvalidPath(String),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("missing `url` query parameter")]
    MissingTarget,

    #[error("request body exceeds the configured limit")]
    BodyTooLarge,

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("proxy request failed: {0}")]
    Upstream(String),

    #[error("proxy request failed: upstream did not respond within {0}ms")]
    UpstreamTimeout(u64),
}

impl ForwardError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingTarget => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) | Self::UpstreamTimeout(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// `{"error":{"message":"..."}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope::new(self.to_string());
        // Serializing a struct of plain strings cannot fail
        let body = serde_json::to_vec(&envelope).unwrap_or_default();

        let mut response = (self.status(), body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        apply_cors(headers);
        response
    }
}

/// Render an error and its full `source()` chain as one line.
///
/// hyper's client errors keep the interesting part (DNS failure,
/// connection refused, ...) in the source chain, not in `Display`.
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        let next = source.to_string();
        if !text.contains(&next) {
            text.push_str(": ");
            text.push_str(&next);
        }
        current = source.source();
    }
    text
}
