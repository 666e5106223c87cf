//! Notification service library.
//!
//! Delivers notifications over an unreliable (simulated) channel, keeps a
//! bounded per-recipient history and process-wide delivery statistics.
//!
//! # Architecture
//!
//! ```text
//! POST /api/notifications/send[/batch]
//!         ↓
//! NotificationDispatcher ── DashMap<recipient, VecDeque<record>> (≤ 100 each)
//!         │              └─ AtomicU64 counters (success / failure)
//!         ↓
//! DeliveryChannel (DeliverySimulator: random delay + random outcome)
//! ```
//!
//! Delivery failures never surface as errors: they are recorded as failed
//! notifications and show up in history and statistics only.

pub mod api;
pub mod dispatcher;
pub mod error;
pub mod simulator;
pub mod types;

pub use api::{create_router, AppState};
pub use dispatcher::{DeliveryCounters, NotificationDispatcher, MAX_HISTORY_PER_RECIPIENT};
pub use error::{Error, Result};
pub use simulator::{DeliveryChannel, DeliverySimulator, SimulatorConfig};
pub use types::{DeliveryStatistics, NotificationRecord, NotificationType};
