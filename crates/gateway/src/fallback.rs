//! Fixed fallback responders, one per service.

use common::FallbackResponse;
use std::collections::HashMap;

/// Message used for services without a configured fallback message.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Service temporarily unavailable, please try again later";

#[derive(Debug, Clone)]
struct Responder {
    service_name: String,
    message: String,
}

/// Service key (`orders`) → degraded-mode body.
#[derive(Debug, Clone, Default)]
pub struct FallbackResponder {
    responders: HashMap<String, Responder>,
}

impl FallbackResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: impl Into<String>,
        service_name: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.responders.insert(
            key.into(),
            Responder {
                service_name: service_name.into(),
                message: message.into(),
            },
        );
    }

    /// Fresh fallback body for a service key, or `None` if none is registered.
    pub fn respond(&self, key: &str) -> Option<FallbackResponse> {
        self.responders
            .get(key)
            .map(|r| FallbackResponse::new(&r.service_name, &r.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond() {
        let mut responder = FallbackResponder::new();
        responder.register("orders", "order-service", "Order service is unavailable");

        let body = responder.respond("orders").unwrap();
        assert_eq!(body.status, "fallback");
        assert_eq!(body.service, "order-service");
        assert_eq!(body.message, "Order service is unavailable");

        assert!(responder.respond("users").is_none());
    }
}
