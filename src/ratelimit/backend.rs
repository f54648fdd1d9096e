//! Decision backend trait for abstracting the rate limit service client.

use async_trait::async_trait;
use thiserror::Error;

use super::dimension::Dimension;
use super::evaluator::Verdict;

/// Errors contacting the external decision service.
///
/// Kept separate from [`TollgateError`](crate::error::TollgateError):
/// the filter's fail-open rule applies to these errors and nothing else,
/// so a configuration or server fault can never be mistaken for a
/// decision-service outage and silently admitted.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// The RPC failed: service unreachable, deadline exceeded, response
    /// undecodable, or the service answered with an error status.
    #[error("decision service call failed: {0}")]
    Rpc(#[from] tonic::Status),
}

/// Trait for rate limit decision backends.
///
/// Abstracts the gRPC client so the evaluator and filter can be exercised
/// against scripted backends in tests.
#[async_trait]
pub trait DecisionBackend: Send + Sync {
    /// Ask the decision service for a verdict on a single dimension.
    ///
    /// Each dimension is queried at most once per request evaluation; no
    /// retries are performed at this layer.
    async fn should_rate_limit(
        &self,
        domain: &str,
        dimension: &Dimension,
    ) -> Result<Verdict, DecisionError>;
}
