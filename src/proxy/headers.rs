//! Header filtering in both directions and the CORS header set.
//!
//! [`filter_request_headers`] drops browser-internal and transport
//! headers before a request leaves for the target.
//! [`filter_response_headers`] drops transport-encoding metadata that
//! no longer describes the re-buffered body. [`apply_cors`] stamps the
//! permissive CORS set onto any outgoing response, replacing whatever
//! the upstream sent under the same names.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Request headers never forwarded to the target.
pub const SKIP_REQUEST_HEADERS: &[&str] = &[
    "host",
    "connection",
    "accept-encoding",
    "origin",
    "referer",
    "sec-fetch-mode",
    "sec-fetch-site",
    "sec-fetch-dest",
    "sec-ch-ua",
    "sec-ch-ua-mobile",
    "sec-ch-ua-platform",
];

/// Upstream response headers never relayed to the caller.
pub const SKIP_RESPONSE_HEADERS: &[&str] =
    &["content-encoding", "transfer-encoding", "connection"];

pub const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
    (header::ACCESS_CONTROL_EXPOSE_HEADERS, "*"),
];

fn is_listed(list: &[&str], name: &HeaderName) -> bool {
    // HeaderName is always lowercase, but the lists are compared loosely anyway
    list.iter().any(|skip| name.as_str().eq_ignore_ascii_case(skip))
}

#[must_use]
pub fn is_skipped_request_header(name: &HeaderName) -> bool {
    is_listed(SKIP_REQUEST_HEADERS, name)
}

#[must_use]
pub fn is_skipped_response_header(name: &HeaderName) -> bool {
    is_listed(SKIP_RESPONSE_HEADERS, name)
}

/// Build the outbound header set from the caller's headers.
///
/// Everything outside [`SKIP_REQUEST_HEADERS`] is copied, repeated
/// values included, so `Authorization` and API-key headers reach the
/// target untouched. `content-length` is left for the client to
/// recompute from the body actually sent.
#[must_use]
pub fn filter_request_headers(original: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(original.len());
    for (name, value) in original {
        if is_skipped_request_header(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Build the relayed header set from the upstream's headers.
///
/// The body has been fully collected, so the upstream `content-length`
/// is dropped too and recomputed by the server from the actual bytes.
/// A `HEAD` answer has no bytes to recompute from, so its
/// `content-length` is kept when `head` is set.
#[must_use]
pub fn filter_response_headers(upstream: &HeaderMap, head: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + CORS_HEADERS.len());
    for (name, value) in upstream {
        if is_skipped_response_header(name) || (!head && name == header::CONTENT_LENGTH) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Insert the CORS header set, overwriting any existing values.
pub fn apply_cors(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

#[must_use]
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(CORS_HEADERS.len());
    apply_cors(&mut headers);
    headers
}
