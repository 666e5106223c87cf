//! Simulated outbound delivery channel.
//!
//! Models an unreliable provider: every attempt waits a random delay and then
//! succeeds with a configurable probability. The random source is injectable
//! (see [`DeliverySimulator::with_seed`]) so outcomes can be reproduced.

use crate::error::{Error, Result};
use crate::types::NotificationType;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Default probability that an attempt is delivered.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// Default lower bound of the simulated latency.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(100);

/// Default upper bound of the simulated latency.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(300);

/// Outbound channel used by the dispatcher.
///
/// Implementations may suspend (network latency) but must not hold shared
/// locks while doing so. An `Err` is treated exactly like an undelivered
/// notification by the caller.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Attempt one delivery. Returns whether the notification was delivered.
    async fn attempt(&self, recipient: &str, kind: NotificationType) -> Result<bool>;
}

/// Simulator configuration.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Probability in `[0, 1]` that an attempt succeeds.
    pub success_rate: f64,
    /// Minimum simulated latency.
    pub min_delay: Duration,
    /// Maximum simulated latency (inclusive).
    pub max_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            success_rate: DEFAULT_SUCCESS_RATE,
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl SimulatorConfig {
    /// Instant, always-successful configuration.
    pub fn reliable() -> Self {
        Self {
            success_rate: 1.0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(Error::InvalidConfig(format!(
                "success rate must be within [0, 1], got {}",
                self.success_rate
            )));
        }
        if self.min_delay > self.max_delay {
            return Err(Error::InvalidConfig(format!(
                "min delay {:?} exceeds max delay {:?}",
                self.min_delay, self.max_delay
            )));
        }
        Ok(())
    }
}

/// Random-latency, random-outcome delivery channel.
pub struct DeliverySimulator {
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
}

impl DeliverySimulator {
    /// Create a simulator seeded from OS entropy.
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a simulator with a fixed seed (reproducible outcome sequence).
    pub fn with_seed(config: SimulatorConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Create a simulator drawing from the given random source.
    pub fn with_rng(config: SimulatorConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Draw latency and outcome for one attempt. The lock is released on return.
    fn draw(&self) -> Result<(Duration, bool)> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| Error::Delivery("random source poisoned".to_string()))?;

        let min_ms = self.config.min_delay.as_millis() as u64;
        let max_ms = self.config.max_delay.as_millis() as u64;
        let delay_ms = if max_ms > min_ms {
            rng.gen_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        let delivered = rng.gen_bool(self.config.success_rate);

        Ok((Duration::from_millis(delay_ms), delivered))
    }
}

#[async_trait]
impl DeliveryChannel for DeliverySimulator {
    async fn attempt(&self, recipient: &str, kind: NotificationType) -> Result<bool> {
        let (delay, delivered) = self.draw()?;

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        debug!(
            "Simulated {} delivery to {} after {:?}: {}",
            kind,
            recipient,
            delay,
            if delivered { "delivered" } else { "dropped" }
        );

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(success_rate: f64) -> SimulatorConfig {
        SimulatorConfig {
            success_rate,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert_eq!(config.success_rate, 0.9);
        assert_eq!(config.min_delay, Duration::from_millis(100));
        assert_eq!(config.max_delay, Duration::from_millis(300));
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(DeliverySimulator::new(instant(1.5)).is_err());
        assert!(DeliverySimulator::new(instant(-0.1)).is_err());
        assert!(DeliverySimulator::new(instant(f64::NAN)).is_err());

        let inverted = SimulatorConfig {
            success_rate: 0.5,
            min_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(100),
        };
        assert!(DeliverySimulator::new(inverted).is_err());
    }

    #[tokio::test]
    async fn test_certain_outcomes() {
        let always = DeliverySimulator::new(instant(1.0)).unwrap();
        let never = DeliverySimulator::new(instant(0.0)).unwrap();

        for _ in 0..20 {
            assert!(always.attempt("alice", NotificationType::Email).await.unwrap());
            assert!(!never.attempt("alice", NotificationType::Sms).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_seeded_simulators_agree() {
        let a = DeliverySimulator::with_seed(instant(0.5), 7).unwrap();
        let b = DeliverySimulator::with_seed(instant(0.5), 7).unwrap();

        for _ in 0..50 {
            let left = a.attempt("bob", NotificationType::Push).await.unwrap();
            let right = b.attempt("bob", NotificationType::Push).await.unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_delay_within_bounds() {
        let config = SimulatorConfig {
            success_rate: 0.9,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
        };
        let simulator = DeliverySimulator::with_seed(config, 42).unwrap();

        for _ in 0..200 {
            let (delay, _) = simulator.draw().unwrap();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_waits_for_delay() {
        let config = SimulatorConfig {
            success_rate: 1.0,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_millis(200),
        };
        let simulator = DeliverySimulator::new(config).unwrap();

        let start = tokio::time::Instant::now();
        simulator.attempt("carol", NotificationType::Email).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
