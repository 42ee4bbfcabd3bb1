//! Error handling for the API server.

pub mod response;
pub mod types;

pub use types::{ApiError, ApiResult};

use std::fmt::Display;
use tracing::error;

/// Stop the process on a condition where guessing a value would be worse than stopping.
pub fn fatal<E: Display + ?Sized>(err: &E) -> ! {
    error!(error = %err, "Unrecoverable error, terminating");
    std::process::exit(1)
}
