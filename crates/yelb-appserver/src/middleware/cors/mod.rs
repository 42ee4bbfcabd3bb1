//! CORS (Cross-Origin Resource Sharing) middleware.

pub mod config;
pub mod layer;

pub use config::CorsConfig;
pub use layer::{CorsLayer, CorsMiddleware};
