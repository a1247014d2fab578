//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the conversion service.

pub(crate) mod handlers;
pub(crate) mod rate_limit;
mod server;

pub use handlers::AppState;
pub use rate_limit::RateLimiterState;
pub use server::HttpServer;
