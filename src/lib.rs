//! Tollgate - HTTP Rate Limiting Middleware
//!
//! This crate implements an HTTP middleware that delegates rate limiting
//! decisions to Envoy's global rate limit service over gRPC. Each request
//! is checked per API key and per API product before it reaches the
//! application; over-limit requests are rejected with 429, and a decision
//! service outage fails open rather than blocking traffic.

pub mod config;
pub mod error;
pub mod grpc;
pub mod http;
pub mod ratelimit;
