//! Rate limit decision service client.

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use super::proto::envoy::service::ratelimit::v3::{
    rate_limit_response::Code, rate_limit_service_client::RateLimitServiceClient,
    RateLimitRequest,
};
use crate::config::DecisionServiceConfig;
use crate::error::TollgateError;
use crate::ratelimit::{DecisionBackend, DecisionError, Dimension, Verdict};

/// gRPC client for the Envoy rate limit decision service.
///
/// Wraps a single long-lived channel established at startup and reused
/// across all request evaluations. Cloning is cheap: all clones multiplex
/// over the same underlying connection.
#[derive(Clone)]
pub struct GrpcDecisionClient {
    /// Generated service client over the shared channel
    client: RateLimitServiceClient<Channel>,
}

impl GrpcDecisionClient {
    /// Create a client over an existing channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            client: RateLimitServiceClient::new(channel),
        }
    }

    /// Build the long-lived channel from configuration.
    ///
    /// The connection is established lazily on first use, so startup does
    /// not depend on the decision service being reachable.
    pub fn from_config(config: &DecisionServiceConfig) -> Result<Self, TollgateError> {
        let mut endpoint = Endpoint::from_shared(config.endpoint.clone())?;

        if let Some(timeout_ms) = config.request_timeout_ms {
            endpoint = endpoint.timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(connect_timeout_ms) = config.connect_timeout_ms {
            endpoint = endpoint.connect_timeout(Duration::from_millis(connect_timeout_ms));
        }

        Ok(Self::new(endpoint.connect_lazy()))
    }
}

#[async_trait]
impl DecisionBackend for GrpcDecisionClient {
    /// Issue one ShouldRateLimit call for a single dimension.
    async fn should_rate_limit(
        &self,
        domain: &str,
        dimension: &Dimension,
    ) -> Result<Verdict, DecisionError> {
        let request = RateLimitRequest {
            domain: domain.to_string(),
            descriptors: vec![dimension.to_descriptor()],
            // Unset on purpose: the service counts an unset addend as one hit.
            hits_addend: 0,
        };

        let mut client = self.client.clone();
        let response = client.should_rate_limit(request).await?.into_inner();

        debug!(
            dimension = %dimension,
            overall_code = ?response.overall_code(),
            "Decision service responded"
        );

        Ok(match response.overall_code() {
            Code::OverLimit => Verdict::OverLimit,
            // OK, UNKNOWN, and any future code all admit the request
            _ => Verdict::Ok,
        })
    }
}
