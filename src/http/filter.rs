//! Rate limiting filter.
//!
//! Tower middleware that evaluates every inbound request against the
//! decision service before handing it to the inner service.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::ratelimit::{extract_dimensions, DecisionBackend, RateLimitEvaluator, Verdict};

/// Body sent with a 429 rejection.
const REJECTION_BODY: &str = "Too Many Requests";

/// Tower layer installing the rate limiting filter.
pub struct RateLimitLayer<B: DecisionBackend> {
    evaluator: Arc<RateLimitEvaluator<B>>,
}

impl<B: DecisionBackend> RateLimitLayer<B> {
    /// Create a new layer sharing the given evaluator.
    pub fn new(evaluator: Arc<RateLimitEvaluator<B>>) -> Self {
        Self { evaluator }
    }
}

impl<B: DecisionBackend> Clone for RateLimitLayer<B> {
    fn clone(&self) -> Self {
        Self {
            evaluator: self.evaluator.clone(),
        }
    }
}

impl<S, B: DecisionBackend> Layer<S> for RateLimitLayer<B> {
    type Service = RateLimitFilter<S, B>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitFilter {
            inner,
            evaluator: self.evaluator.clone(),
        }
    }
}

/// Middleware service enforcing the rate limit verdict.
///
/// Over-limit requests are answered with 429 and never reach the inner
/// service. A decision service failure fails open: the request is
/// admitted as if every dimension had passed, since an unreachable
/// limiter must not turn into an outage of the service it protects.
pub struct RateLimitFilter<S, B: DecisionBackend> {
    inner: S,
    evaluator: Arc<RateLimitEvaluator<B>>,
}

impl<S: Clone, B: DecisionBackend> Clone for RateLimitFilter<S, B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            evaluator: self.evaluator.clone(),
        }
    }
}

impl<S, B> Service<Request<Body>> for RateLimitFilter<S, B>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: DecisionBackend + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let evaluator = self.evaluator.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let dimensions = extract_dimensions(req.headers());

            let verdict = match evaluator.evaluate(&dimensions).await {
                Ok(verdict) => verdict,
                Err(error) => {
                    // Fail open: availability over strict enforcement.
                    warn!(error = %error, "Rate limit evaluation failed, admitting request");
                    Verdict::Ok
                }
            };

            match verdict {
                Verdict::OverLimit => {
                    debug!("Request rejected by rate limiter");
                    Ok(too_many_requests())
                }
                Verdict::Ok => inner.call(req).await,
            }
        })
    }
}

/// Build the fixed 429 rejection response.
fn too_many_requests() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, REJECTION_BODY).into_response()
}
