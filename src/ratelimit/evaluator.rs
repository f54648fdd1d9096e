//! Per-request rate limit evaluation.

use tracing::{debug, trace};

use super::backend::{DecisionBackend, DecisionError};
use super::dimension::Dimension;

/// Rate limit domain under which all descriptors are evaluated.
pub const RATE_LIMIT_DOMAIN: &str = "envoy";

/// Verdict returned by the decision service for a query.
///
/// Only over-limit is modeled as rejecting; any other response code
/// (including unknown codes a newer service might emit) counts as not
/// over limit. Transport failures are not verdicts and surface as
/// [`DecisionError`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The request is within the limit
    Ok,
    /// The request exceeds the configured limit
    OverLimit,
}

impl Verdict {
    /// Whether this verdict rejects the request.
    pub fn is_over_limit(&self) -> bool {
        matches!(self, Verdict::OverLimit)
    }
}

/// Evaluates the rate limit dimensions of one request against a decision
/// backend.
///
/// Dimensions are queried sequentially in the order given. Evaluation is
/// a strict left-to-right short-circuit fold: the first over-limit
/// verdict or backend failure ends it, and later dimensions are never
/// queried once the aggregate outcome is known.
pub struct RateLimitEvaluator<B: DecisionBackend> {
    /// Backend answering per-dimension queries
    backend: B,
}

impl<B: DecisionBackend> RateLimitEvaluator<B> {
    /// Create a new evaluator over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Evaluate all dimensions and produce the aggregate verdict.
    ///
    /// Returns `Ok(Verdict::Ok)` only when every dimension passed. A
    /// backend failure for any dimension aborts evaluation and is
    /// returned as-is for the caller to interpret.
    pub async fn evaluate(&self, dimensions: &[Dimension]) -> Result<Verdict, DecisionError> {
        for dimension in dimensions {
            trace!(dimension = %dimension, "Querying decision service");

            let verdict = self
                .backend
                .should_rate_limit(RATE_LIMIT_DOMAIN, dimension)
                .await?;

            if verdict.is_over_limit() {
                debug!(dimension = %dimension, "Dimension is over limit");
                return Ok(Verdict::OverLimit);
            }
        }

        Ok(Verdict::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio_test::assert_ok;

    /// Backend that replays scripted outcomes and records every query.
    #[derive(Clone)]
    struct ScriptedBackend {
        outcomes: Arc<Mutex<VecDeque<Result<Verdict, DecisionError>>>>,
        calls: Arc<Mutex<Vec<(String, Dimension)>>>,
    }

    impl ScriptedBackend {
        fn new(outcomes: Vec<Result<Verdict, DecisionError>>) -> Self {
            Self {
                outcomes: Arc::new(Mutex::new(outcomes.into())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<(String, Dimension)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DecisionBackend for ScriptedBackend {
        async fn should_rate_limit(
            &self,
            domain: &str,
            dimension: &Dimension,
        ) -> Result<Verdict, DecisionError> {
            self.calls
                .lock()
                .unwrap()
                .push((domain.to_string(), dimension.clone()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("no outcome scripted for this call")
        }
    }

    fn unavailable() -> DecisionError {
        DecisionError::Rpc(tonic::Status::unavailable("connection refused"))
    }

    fn test_dimensions() -> Vec<Dimension> {
        vec![
            Dimension::new("api_key", "abc123"),
            Dimension::new("api_product", "payments"),
        ]
    }

    #[tokio::test]
    async fn test_all_ok_yields_ok() {
        let backend = ScriptedBackend::new(vec![Ok(Verdict::Ok), Ok(Verdict::Ok)]);
        let evaluator = RateLimitEvaluator::new(backend.clone());

        let verdict = assert_ok!(evaluator.evaluate(&test_dimensions()).await);

        assert_eq!(verdict, Verdict::Ok);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_first_over_limit_skips_second_dimension() {
        let backend = ScriptedBackend::new(vec![Ok(Verdict::OverLimit)]);
        let evaluator = RateLimitEvaluator::new(backend.clone());

        let verdict = assert_ok!(evaluator.evaluate(&test_dimensions()).await);

        assert_eq!(verdict, Verdict::OverLimit);
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.key, "api_key");
    }

    #[tokio::test]
    async fn test_second_over_limit_yields_over_limit() {
        let backend = ScriptedBackend::new(vec![Ok(Verdict::Ok), Ok(Verdict::OverLimit)]);
        let evaluator = RateLimitEvaluator::new(backend.clone());

        let verdict = assert_ok!(evaluator.evaluate(&test_dimensions()).await);

        assert_eq!(verdict, Verdict::OverLimit);
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.key, "api_key");
        assert_eq!(calls[1].1.key, "api_product");
    }

    #[tokio::test]
    async fn test_failure_short_circuits() {
        let backend = ScriptedBackend::new(vec![Err(unavailable())]);
        let evaluator = RateLimitEvaluator::new(backend.clone());

        let outcome = evaluator.evaluate(&test_dimensions()).await;

        assert!(outcome.is_err());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_queries_use_fixed_domain() {
        let backend = ScriptedBackend::new(vec![Ok(Verdict::Ok), Ok(Verdict::Ok)]);
        let evaluator = RateLimitEvaluator::new(backend.clone());

        evaluator.evaluate(&test_dimensions()).await.unwrap();

        assert!(backend.calls().iter().all(|(domain, _)| domain == "envoy"));
    }

    #[tokio::test]
    async fn test_no_dimensions_yields_ok() {
        let backend = ScriptedBackend::new(vec![]);
        let evaluator = RateLimitEvaluator::new(backend.clone());

        let verdict = assert_ok!(evaluator.evaluate(&[]).await);

        assert_eq!(verdict, Verdict::Ok);
        assert!(backend.calls().is_empty());
    }
}
