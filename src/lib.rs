//! corsproxy is a stateless CORS forwarding proxy.
//!
//! A browser client calls `/proxy?url=<encoded target>`; the request is
//! forwarded server-side to the target with browser-internal headers
//! stripped, and the upstream answer is relayed back with a permissive
//! CORS header set so the browser lets the page read it. Preflight
//! `OPTIONS` requests are answered locally.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`error`] -- Startup errors and the per-request JSON error envelope.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Core forwarding: target extraction, header filtering,
//!   the single upstream call, and relay.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod server;
