//! Degraded-mode response body returned by the gateway.

use serde::{Deserialize, Serialize};

/// Constant `status` value of every fallback body.
pub const FALLBACK_STATUS: &str = "fallback";

/// Body returned (with HTTP 200) in place of an unreachable upstream's answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackResponse {
    pub message: String,
    pub status: String,
    pub service: String,
}

impl FallbackResponse {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: FALLBACK_STATUS.to_string(),
            service: service.into(),
        }
    }
}
