//! Error types for the order service.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for order service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Order service errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Order request that cannot be turned into an order.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Unknown order status string.
    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    /// HTTP error talking to a remote service (connect, non-2xx, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote call exceeded its deadline.
    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),
}
