//! Target URL extraction from the `url` query parameter.

use axum::http::Uri;

use crate::error::ForwardError;

pub const TARGET_PARAM: &str = "url";

/// Return the first value of `?url=`, percent-decoded.
///
/// The value is not validated beyond being present and non-empty. A
/// malformed target is left for the HTTP client to reject, which
/// surfaces as a forward failure.
pub fn extract_target(uri: &Uri) -> Result<String, ForwardError> {
    let query = uri.query().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(ForwardError::MissingTarget)
}

/// Loggable form of a target: scheme, host, port and path only.
///
/// Query strings, fragments and userinfo can carry API keys (`?key=...`)
/// and never reach the logs.
#[must_use]
pub fn redact_target(target: &str) -> String {
    match url::Url::parse(target) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        Err(_) => target
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
