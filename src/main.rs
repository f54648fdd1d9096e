use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use tollgate::config::TollgateConfig;
use tollgate::grpc::GrpcDecisionClient;
use tollgate::http::HttpServer;
use tollgate::ratelimit::RateLimitEvaluator;

/// HTTP rate limiting middleware backed by Envoy's rate limit service.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Tollgate Rate Limiting Middleware");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => TollgateConfig::from_file(path)?,
        None => TollgateConfig::default(),
    };
    info!(
        http_addr = %config.server.http_addr,
        decision_service = %config.decision_service.endpoint,
        "Configuration loaded"
    );

    // One lazily-connected channel, reused across all request evaluations
    let client = GrpcDecisionClient::from_config(&config.decision_service)?;
    let evaluator = Arc::new(RateLimitEvaluator::new(client));
    info!("Decision service client initialized");

    let server = HttpServer::new(config.server.http_addr, evaluator);

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    info!("Tollgate Rate Limiting Middleware stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
