//! Quandl Functions Cloud API Server
//!
//! REST API that hosts the function pack for spreadsheet integrations
//!
//! Usage:
//!   cargo run --bin quandl_api
//!
//! Environment:
//!   QUANDL_API_KEY  - Quandl API key (required)
//!   PACK_API_KEY    - Service API key; when unset the API is open
//!   PORT            - Server port (default: 8080)
//!   PACK_HOST       - Server host (default: 0.0.0.0)
//!   RUST_LOG        - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use quandl_functions::api::{create_router, handlers::AppState, start_cleanup_task};
use quandl_functions::{PackConfig, TelemetryCollector};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    print_banner();

    // Load configuration
    let config = PackConfig::default();
    if config.api_key.is_none() {
        eprintln!("⚠️  WARNING: QUANDL_API_KEY not set!");
        eprintln!("   export QUANDL_API_KEY=\"your-key\"");
        eprintln!();
    }

    // Initialize telemetry
    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    // Create app state (builds the Quandl client)
    let state = Arc::new(AppState::new(config, telemetry)?);

    // Start background cleanup task for rate limiter
    start_cleanup_task();
    info!("🧹 Background cleanup task started");

    // Create router
    let app = create_router(state);

    // Get server config from env
    // Hosted platforms inject PORT; fall back to PACK_PORT for local dev
    let host = std::env::var("PACK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("PACK_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 Quandl Functions API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /v1/functions/:name  - Invoke a function (positional args)");
    info!("  GET  /v1/functions        - Function manifest");
    info!("  GET  /v1/stats            - Invocation statistics");
    info!("  GET  /v1/health           - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");
    info!("");

    // Start server with graceful shutdown
    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    // Graceful shutdown sequence
    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");

    let stats = telemetry_for_shutdown.get_stats();
    info!("   Total invocations: {}", stats.total_invocations);
    info!("   Total errors:      {}", stats.total_errors);
    info!("   Rows returned:     {}", stats.total_rows_returned);
    info!("   Avg latency:       {:.2}ms", stats.avg_latency_ms);

    match telemetry_for_shutdown.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }

    info!("👋 Quandl Functions API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════════════════╗
    ║                                                          ║
    ║        Q U A N D L   F U N C T I O N   P A C K           ║
    ║                                                          ║
    ║              C L O U D   A P I   v0.1.0                  ║
    ║        quandl-series · quandl-table · quandl-list        ║
    ║                                                          ║
    ╚══════════════════════════════════════════════════════════╝
    "#
    );
}
