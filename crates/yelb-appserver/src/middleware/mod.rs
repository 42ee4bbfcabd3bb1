//! Middleware for the Yelb application server.

pub mod cors;
pub mod logging;

pub use cors::{CorsConfig, CorsLayer, CorsMiddleware};
pub use logging::{LoggingLayer, LoggingMiddleware};
