//! Core CORS forwarding handler.
//!
//! [`forward_handler`] is mounted on the proxy path. A preflight
//! `OPTIONS` is answered locally; every other method is forwarded to
//! the URL named by the `url` query parameter and the upstream answer
//! is relayed back with the CORS header set merged in. Submodules handle
//! target extraction ([`target`]), header filtering ([`headers`]) and
//! the outbound call ([`upstream`]).

pub mod headers;
pub mod target;
pub mod upstream;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::{error_chain, ForwardError};
use crate::server::AppState;

use self::headers::{apply_cors, cors_headers, filter_request_headers, filter_response_headers};
use self::upstream::{UpstreamRequest, UpstreamResponse};

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Body,
) -> Response {
    if method == Method::OPTIONS {
        state.stats.preflight.fetch_add(1, Ordering::Relaxed);
        return preflight_response();
    }

    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    match forward(&state, method.clone(), &uri, &req_headers, body, &correlation_id).await {
        Ok(response) => {
            state.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            response
        }
        Err(e) => {
            if matches!(e, ForwardError::MissingTarget) {
                state.stats.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    correlation_id = %correlation_id,
                    method = %method,
                    "request without target"
                );
            } else {
                state.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    correlation_id = %correlation_id,
                    method = %method,
                    error = %e,
                    "forwarding failed"
                );
            }
            e.into_response()
        }
    }
}

async fn forward(
    state: &AppState,
    method: Method,
    uri: &Uri,
    req_headers: &HeaderMap,
    body: Body,
    correlation_id: &str,
) -> Result<Response, ForwardError> {
    let target = target::extract_target(uri)?;
    let headers = filter_request_headers(req_headers);

    let body = read_body(body, state.settings.max_body).await?;
    let body = forwards_body(&method, &body).then_some(body);
    let head = method == Method::HEAD;

    tracing::info!(
        correlation_id = %correlation_id,
        method = %method,
        target = %target::redact_target(&target),
        body_bytes = body.as_ref().map_or(0, Bytes::len),
        "forwarding request"
    );

    let response = upstream::send(UpstreamRequest {
        client: &state.http_client,
        target: &target,
        method,
        headers,
        body,
        timeout: state.settings.upstream_timeout,
        correlation_id,
    })
    .await?;

    Ok(relay(response, head))
}

/// `POST` always carries its body; other methods only when one was sent.
#[must_use]
pub fn forwards_body(method: &Method, body: &Bytes) -> bool {
    method == Method::POST || !body.is_empty()
}

async fn read_body(body: Body, limit: Option<usize>) -> Result<Bytes, ForwardError> {
    axum::body::to_bytes(body, limit.unwrap_or(usize::MAX))
        .await
        .map_err(|e| {
            let too_large = std::error::Error::source(&e)
                .is_some_and(|source| source.is::<http_body_util::LengthLimitError>());
            if too_large {
                ForwardError::BodyTooLarge
            } else {
                ForwardError::BodyRead(error_chain(&e))
            }
        })
}

fn relay(upstream: UpstreamResponse, head: bool) -> Response {
    let mut headers = filter_response_headers(&upstream.headers, head);
    apply_cors(&mut headers);

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = headers;
    response
}

fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    *response.headers_mut() = cors_headers();
    response
}
