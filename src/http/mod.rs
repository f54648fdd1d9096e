//! HTTP server and rate limiting filter.

mod filter;
mod server;

pub use filter::{RateLimitFilter, RateLimitLayer};
pub use server::HttpServer;
