//! `corsproxy health`: check the health of a running instance.
//!
//! Sends a `GET /health` request to the specified URL and displays
//! the response as formatted text or raw JSON.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::ProxyError;
use crate::health::HealthResponse;

pub async fn execute(args: HealthArgs) -> Result<(), ProxyError> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| ProxyError::UriParse {
            source: Box::new(e),
        })?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| ProxyError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| ProxyError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| ProxyError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| ProxyError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(ProxyError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => print_summary(&args.url, &health),
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn print_summary(url: &str, health: &HealthResponse) {
    println!("\u{2713} corsproxy {} is healthy ({url})", health.version);
    println!("  uptime:           {}", format_uptime(health.uptime_seconds));
    println!(
        "  upstream timeout: {}",
        health
            .settings
            .upstream_timeout_ms
            .map_or_else(|| "none".to_string(), |ms| format!("{ms}ms"))
    );
    println!(
        "  body limit:       {}",
        health
            .settings
            .max_body_bytes
            .map_or_else(|| "none".to_string(), |b| format!("{b} bytes"))
    );
    println!(
        "  requests:         {} forwarded, {} failed, {} rejected, {} preflights",
        health.stats.requests_forwarded,
        health.stats.requests_failed,
        health.stats.requests_rejected,
        health.stats.preflights
    );
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
