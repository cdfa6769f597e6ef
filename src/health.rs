//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the server
//! version, uptime, the active proxy settings, and cumulative request
//! counters. None of this state influences forwarding.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub settings: SettingsResponse,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct SettingsResponse {
    pub upstream_timeout_ms: Option<u64>,
    pub max_body_bytes: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub requests_forwarded: u64,
    pub requests_failed: u64,
    pub requests_rejected: u64,
    pub preflights: u64,
}

#[allow(clippy::cast_possible_truncation)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        settings: SettingsResponse {
            upstream_timeout_ms: state
                .settings
                .upstream_timeout
                .map(|t| t.as_millis() as u64),
            max_body_bytes: state.settings.max_body,
        },
        stats: StatsResponse {
            requests_forwarded: state.stats.forwarded.load(Ordering::Relaxed),
            requests_failed: state.stats.failed.load(Ordering::Relaxed),
            requests_rejected: state.stats.rejected.load(Ordering::Relaxed),
            preflights: state.stats.preflight.load(Ordering::Relaxed),
        },
    })
}
