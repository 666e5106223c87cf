//! User wire representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Username carried by the placeholder user returned when the user service is
/// unavailable. Dependent logic compares against this exact value.
pub const UNKNOWN_USERNAME: &str = "unknown";

/// Email carried by the placeholder user.
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// Display name carried by the placeholder user.
pub const UNAVAILABLE_FULL_NAME: &str = "User service temporarily unavailable";

/// User as served by `GET /api/users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserDto {
    /// Placeholder user standing in for `id` while the user service is down.
    pub fn unavailable(id: u64) -> Self {
        Self {
            id,
            username: UNKNOWN_USERNAME.to_string(),
            email: UNKNOWN_EMAIL.to_string(),
            full_name: Some(UNAVAILABLE_FULL_NAME.to_string()),
            phone_number: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// True when this is the placeholder rather than a real user.
    pub fn is_unavailable(&self) -> bool {
        self.username == UNKNOWN_USERNAME
    }
}
