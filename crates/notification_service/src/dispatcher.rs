//! Notification dispatcher: delivery, bounded history and statistics.
//!
//! Shared state is limited to two structures:
//! - per-recipient history in a DashMap (sharded locks, so unrelated
//!   recipients never serialize on a single lock)
//! - two atomic outcome counters (the total is derived from them)
//!
//! The delivery attempt itself runs before any of that state is touched, so no
//! lock is held while the channel is suspended.

use crate::simulator::DeliveryChannel;
use crate::types::{DeliveryStatistics, NotificationRecord, NotificationType};
use dashmap::DashMap;
use metrics::counter;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of records kept per recipient. Oldest records are evicted first.
pub const MAX_HISTORY_PER_RECIPIENT: usize = 100;

/// Process-wide delivery counters.
///
/// Only outcomes are stored; the total is derived from them, so every
/// snapshot satisfies `total == success + failure` even while sends run.
#[derive(Debug, Default)]
pub struct DeliveryCounters {
    success: AtomicU64,
    failure: AtomicU64,
}

impl DeliveryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished attempt.
    pub fn record(&self, delivered: bool) {
        if delivered {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DeliveryStatistics {
        let success = self.success.load(Ordering::Relaxed);
        let failure = self.failure.load(Ordering::Relaxed);
        DeliveryStatistics::new(success + failure, success, failure)
    }
}

/// Sends notifications and keeps their outcomes.
///
/// Constructed once per process and shared through `Arc`; all methods take
/// `&self`.
pub struct NotificationDispatcher {
    channel: Arc<dyn DeliveryChannel>,
    /// recipient -> records, oldest first
    history: DashMap<String, VecDeque<NotificationRecord>>,
    counters: DeliveryCounters,
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn DeliveryChannel>) -> Self {
        Self {
            channel,
            history: DashMap::new(),
            counters: DeliveryCounters::new(),
        }
    }

    /// Send one notification. Returns whether it was delivered.
    ///
    /// Channel errors count as failed deliveries; they are logged and recorded
    /// but never returned.
    pub async fn send(
        &self,
        recipient: &str,
        kind: NotificationType,
        title: &str,
        content: &str,
    ) -> bool {
        let delivered = match self.channel.attempt(recipient, kind).await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!("Delivery to {} raised an error: {}", recipient, e);
                counter!("notification_channel_errors_total").increment(1);
                false
            }
        };

        self.record_history(recipient, NotificationRecord::new(kind, title, content, delivered));
        self.counters.record(delivered);

        if delivered {
            counter!("notifications_delivered_total").increment(1);
            debug!("{} notification delivered to {}", kind, recipient);
        } else {
            counter!("notifications_failed_total").increment(1);
            info!("{} notification to {} failed", kind, recipient);
        }

        delivered
    }

    /// Send the same notification to each recipient in order.
    /// Returns the number of successful deliveries.
    pub async fn send_batch(
        &self,
        recipients: &[String],
        kind: NotificationType,
        title: &str,
        content: &str,
    ) -> usize {
        let mut success_count = 0;
        for recipient in recipients {
            if self.send(recipient, kind, title, content).await {
                success_count += 1;
            }
        }

        info!(
            "Batch {} notification: {}/{} delivered",
            kind,
            success_count,
            recipients.len()
        );

        success_count
    }

    /// Records for a recipient, oldest first. Empty for unknown recipients.
    pub fn history(&self, recipient: &str) -> Vec<NotificationRecord> {
        self.history
            .get(recipient)
            .map(|records| records.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn statistics(&self) -> DeliveryStatistics {
        self.counters.snapshot()
    }

    /// Number of recipients with at least one recorded attempt.
    pub fn recipient_count(&self) -> usize {
        self.history.len()
    }

    /// Append under the recipient's shard lock; push and eviction are one step.
    fn record_history(&self, recipient: &str, record: NotificationRecord) {
        let mut records = self.history.entry(recipient.to_string()).or_default();
        records.push_back(record);
        while records.len() > MAX_HISTORY_PER_RECIPIENT {
            records.pop_front();
        }
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("recipients", &self.history.len())
            .field("statistics", &self.counters.snapshot())
            .finish()
    }
}
