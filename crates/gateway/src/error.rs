//! Gateway error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP client error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Pool has no member to forward to.
    #[error("No upstream available in pool: {0}")]
    NoUpstream(String),

    /// Upstream answered with a gateway-class status (502, 503, 504).
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(StatusCode),

    /// No route matches the inbound path.
    #[error("No route for path: {0}")]
    NoRoute(String),

    /// Route pattern rejected at table construction.
    #[error("Invalid route pattern: {0}")]
    InvalidPattern(String),

    /// Inbound request could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
