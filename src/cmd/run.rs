//! `corsproxy run`: start the proxy server.
//!
//! Initializes logging, builds the shared state from the CLI settings,
//! and serves the router until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::error::ProxyError;
use crate::logging;
use crate::server::{self, AppState, Settings};

pub async fn execute(args: RunArgs) -> Result<(), ProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    server::validate_proxy_path(&args.path)?;

    let settings = Settings {
        upstream_timeout: args.upstream_timeout_ms.map(Duration::from_millis),
        max_body: args.max_body,
    };
    let state = Arc::new(AppState::new(settings));
    let router = server::build_router(state, &args.path);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        path = %args.path,
        upstream_timeout_ms = ?args.upstream_timeout_ms,
        max_body = ?args.max_body,
        "corsproxy started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("corsproxy stopped");
    Ok(())
}
