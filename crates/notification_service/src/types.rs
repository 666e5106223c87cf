//! Notification domain types.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery channel kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    #[serde(alias = "email")]
    Email,
    #[serde(alias = "sms")]
    Sms,
    #[serde(alias = "push")]
    Push,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::Email => write!(f, "EMAIL"),
            NotificationType::Sms => write!(f, "SMS"),
            NotificationType::Push => write!(f, "PUSH"),
        }
    }
}

/// One send attempt, successful or not. Never mutated after it is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRecord {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub content: String,
    pub success: bool,
    /// ISO-8601 (RFC 3339, UTC, millisecond precision).
    pub timestamp: String,
}

impl NotificationRecord {
    pub fn new(kind: NotificationType, title: &str, content: &str, success: bool) -> Self {
        Self {
            kind,
            title: title.to_string(),
            content: content.to_string(),
            success,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Point-in-time view of the delivery counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatistics {
    pub total_notifications: u64,
    pub successful_notifications: u64,
    pub failed_notifications: u64,
    /// Percentage in `[0, 100]`; `0.0` when nothing has been sent.
    pub success_rate: f64,
}

impl DeliveryStatistics {
    pub fn new(total: u64, success: u64, failure: u64) -> Self {
        Self {
            total_notifications: total,
            successful_notifications: success,
            failed_notifications: failure,
            success_rate: success_rate(success, total),
        }
    }
}

/// `success / total * 100`, or `0.0` for an empty total.
pub fn success_rate(success: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    success as f64 / total as f64 * 100.0
}
