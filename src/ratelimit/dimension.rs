//! Rate limit dimension extraction.

use axum::http::HeaderMap;

use crate::grpc::proto::envoy::extensions::common::ratelimit::v3::{
    rate_limit_descriptor::Entry, RateLimitDescriptor,
};

/// Value substituted when an identifying header is absent.
///
/// Both axes share this literal, so unidentified traffic collapses onto
/// one bucket per axis. The buckets stay distinct as long as the decision
/// service keys its limits on the descriptor key as well as the value.
pub const ANONYMOUS: &str = "anonymous";

/// Header carrying the caller's API key.
const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the API product being invoked.
const API_PRODUCT_HEADER: &str = "x-api-product";

/// One axis along which a request is rate limited.
///
/// A dimension is a single named key/value pair (e.g. `api_key=abc123`)
/// and maps one-to-one onto a wire descriptor with a single entry. It is
/// built once per request per axis and discarded after evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    /// Descriptor key identifying the axis
    pub key: String,
    /// Extracted or fallback value for this request
    pub value: String,
}

impl Dimension {
    /// Create a new dimension.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Convert this dimension to a single-entry wire descriptor.
    pub fn to_descriptor(&self) -> RateLimitDescriptor {
        RateLimitDescriptor {
            entries: vec![Entry {
                key: self.key.clone(),
                value: self.value.clone(),
            }],
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Extract the rate limit dimensions for a request.
///
/// Order is fixed and significant: the API key dimension is evaluated
/// before the API product dimension, and the evaluator stops at the first
/// over-limit axis. A missing header is not an error; the dimension
/// degrades to [`ANONYMOUS`] so unidentified traffic is still limited.
pub fn extract_dimensions(headers: &HeaderMap) -> Vec<Dimension> {
    vec![
        Dimension::new("api_key", header_or_anonymous(headers, API_KEY_HEADER)),
        Dimension::new(
            "api_product",
            header_or_anonymous(headers, API_PRODUCT_HEADER),
        ),
    ]
}

/// Read the first value of a header, falling back to [`ANONYMOUS`] when
/// the header is absent or its value is not valid visible ASCII.
fn header_or_anonymous<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(ANONYMOUS)
}
