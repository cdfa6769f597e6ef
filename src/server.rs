//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the HTTP
//! client, runtime settings, stats, and uptime), [`build_router`] for
//! mounting the forwarding handler on the proxy path,
//! [`build_http_client`] for the outbound hyper client, and
//! [`shutdown_signal`] for SIGTERM / Ctrl+C handling.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{any, get};
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ProxyError;
use crate::health::health_handler;
use crate::proxy;

pub const DEFAULT_PROXY_PATH: &str = "/proxy";

#[derive(Debug)]
pub struct Stats {
    pub forwarded: AtomicU64,
    pub failed: AtomicU64,
    pub rejected: AtomicU64,
    pub preflight: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            forwarded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            preflight: AtomicU64::new(0),
        }
    }
}

/// Operator-tunable limits. Both are off unless configured.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub upstream_timeout: Option<Duration>,
    pub max_body: Option<usize>,
}

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub http_client: HttpClient,
    pub settings: Settings,
    pub start_time: Instant,
    pub stats: Stats,
}

impl AppState {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            http_client: build_http_client(),
            settings,
            start_time: Instant::now(),
            stats: Stats::new(),
        }
    }
}

/// Build the outbound client.
///
/// Idle connections are not kept: every forwarded request opens its
/// own connection to its target.
#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(https)
}

/// The proxy path must be absolute, literal, and must not shadow `/health`.
///
/// axum treats `:` and `{...}` as capture syntax and panics on malformed
/// captures when the route is registered.
pub fn validate_proxy_path(path: &str) -> Result<(), ProxyError> {
    let literal = !path.contains([':', '{', '}']);
    if path.starts_with('/') && path != "/health" && literal {
        Ok(())
    } else {
        Err(ProxyError::InvalidPath(path.to_string()))
    }
}

pub fn build_router(state: Arc<AppState>, proxy_path: &str) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(proxy_path, any(proxy::forward_handler))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(ServiceBuilder::new().layer(
            // The query string holds the target URL, which may carry an API key
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::debug_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path()
                )
            }),
        ))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_path_must_be_absolute() {
        assert!(validate_proxy_path("/proxy").is_ok());
        assert!(validate_proxy_path("/api/proxy").is_ok());
        assert!(validate_proxy_path("proxy").is_err());
        assert!(validate_proxy_path("").is_err());
    }

    #[test]
    fn proxy_path_rejects_capture_syntax() {
        assert!(validate_proxy_path("/a/:id").is_err());
        assert!(validate_proxy_path("/{x").is_err());
        assert!(validate_proxy_path("/api/{*rest}").is_err());
        assert!(matches!(
            validate_proxy_path("/x}"),
            Err(ProxyError::InvalidPath(p)) if p == "/x}"
        ));
    }

    #[test]
    fn proxy_path_cannot_shadow_health() {
        assert!(validate_proxy_path("/health").is_err());
    }
}
