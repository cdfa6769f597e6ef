//! Single outbound request to the caller-chosen target.
//!
//! Exactly one attempt is made per inbound request. Any HTTP status the
//! target answers with counts as success; only transport-level failures
//! (bad URI, DNS, refused connection, protocol error, optional timeout)
//! are reported as [`ForwardError`].

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use crate::error::{error_chain, ForwardError};
use crate::server::HttpClient;

use super::target::redact_target;

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub struct UpstreamRequest<'a> {
    pub client: &'a HttpClient,
    pub target: &'a str,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
    pub correlation_id: &'a str,
}

pub async fn send(req: UpstreamRequest<'_>) -> Result<UpstreamResponse, ForwardError> {
    let start = Instant::now();
    let client = req.client;

    let uri: Uri = req
        .target
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ForwardError::Upstream(e.to_string()))?;

    let mut outbound = hyper::Request::builder().method(req.method).uri(uri);
    if let Some(headers) = outbound.headers_mut() {
        *headers = req.headers;
    }
    let outbound = outbound
        .body(Full::new(req.body.unwrap_or_default()))
        .map_err(|e| ForwardError::Upstream(e.to_string()))?;

    let exchange = async move {
        let response = client
            .request(outbound)
            .await
            .map_err(|e| ForwardError::Upstream(error_chain(&e)))?;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| ForwardError::Upstream(error_chain(&e)))?
            .to_bytes();
        Ok::<_, ForwardError>(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    };

    let result = match req.timeout {
        Some(timeout) => tokio::time::timeout(timeout, exchange)
            .await
            .unwrap_or_else(|_| Err(ForwardError::UpstreamTimeout(duration_ms(timeout)))),
        None => exchange.await,
    };

    let latency_ms = duration_ms(start.elapsed());
    let logged_target = redact_target(req.target);
    match &result {
        Ok(response) => tracing::info!(
            correlation_id = %req.correlation_id,
            target = %logged_target,
            status = response.status.as_u16(),
            latency_ms,
            "upstream responded"
        ),
        Err(e) => tracing::warn!(
            correlation_id = %req.correlation_id,
            target = %logged_target,
            error = %e,
            latency_ms,
            "upstream request failed"
        ),
    }

    result
}

#[allow(clippy::cast_possible_truncation)]
const fn duration_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}
