//! Service health payloads.
//!
//! Every service answers `GET /api/<service>/health` and `GET /actuator/health`
//! with a [`ServiceHealth`]. The resilient user client produces the same shape
//! (with [`HealthState::Down`]) when the user service cannot be reached.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Liveness of a service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthState {
    Up,
    Down,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Up => write!(f, "UP"),
            HealthState::Down => write!(f, "DOWN"),
        }
    }
}

/// Health report of a single service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceHealth {
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub status: HealthState,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ServiceHealth {
    /// A running service reporting itself.
    pub fn up(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: Some(version.into()),
            status: HealthState::Up,
            timestamp: now_millis(),
        }
    }

    /// A service that could not be reached.
    pub fn down(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: None,
            status: HealthState::Down,
            timestamp: now_millis(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == HealthState::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let health = ServiceHealth::down("user-service");
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "DOWN");
        assert_eq!(json["service"], "user-service");
        assert!(json.get("version").is_none());
    }

    #[test]
    fn test_parse_live_payload() {
        let raw = r#"{"service":"user-service","version":"1.0.0","status":"UP","timestamp":1704067200000}"#;
        let health: ServiceHealth = serde_json::from_str(raw).unwrap();
        assert!(health.is_up());
        assert_eq!(health.version.as_deref(), Some("1.0.0"));
        assert_eq!(health.timestamp, 1704067200000);
    }
}
