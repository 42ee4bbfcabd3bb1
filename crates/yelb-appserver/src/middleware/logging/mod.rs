//! Request logging middleware.

pub mod layer;

pub use layer::{LoggingLayer, LoggingMiddleware};
