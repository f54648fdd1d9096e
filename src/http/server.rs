//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

use super::filter::RateLimitLayer;
use crate::error::Result;
use crate::ratelimit::{DecisionBackend, RateLimitEvaluator};

/// HTTP server with the rate limiting filter installed.
pub struct HttpServer<B: DecisionBackend + 'static> {
    /// Address to bind to
    addr: SocketAddr,
    /// Shared evaluator used by the filter
    evaluator: Arc<RateLimitEvaluator<B>>,
}

impl<B: DecisionBackend + 'static> HttpServer<B> {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, evaluator: Arc<RateLimitEvaluator<B>>) -> Self {
        Self { addr, evaluator }
    }

    /// Build the application router with the filter applied to all routes.
    fn router(&self) -> Router {
        Router::new()
            .route("/", get(handle))
            .layer(RateLimitLayer::new(self.evaluator.clone()))
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "Starting HTTP server with rate limiting filter");

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        info!(
            addr = %self.addr,
            "Starting HTTP server with rate limiting filter and graceful shutdown"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await?;
        Ok(())
    }
}

/// Placeholder upstream handler. Deployments mount their own application
/// routes behind the filter; this keeps the binary runnable on its own.
async fn handle() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::ratelimit::{DecisionError, Dimension, Verdict};

    struct AlwaysOk;

    #[async_trait]
    impl DecisionBackend for AlwaysOk {
        async fn should_rate_limit(
            &self,
            _domain: &str,
            _dimension: &Dimension,
        ) -> std::result::Result<Verdict, DecisionError> {
            Ok(Verdict::Ok)
        }
    }

    #[test]
    fn test_server_creation() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let evaluator = Arc::new(RateLimitEvaluator::new(AlwaysOk));
        let _server = HttpServer::new(addr, evaluator);
    }
}
