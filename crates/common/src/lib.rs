//! Types shared across the gateway, user, order and notification services.

pub mod fallback;
pub mod health;
pub mod user;

pub use fallback::FallbackResponse;
pub use health::{now_millis, HealthState, ServiceHealth};
pub use user::UserDto;
