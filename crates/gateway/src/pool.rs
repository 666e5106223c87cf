//! Upstream pools and load balancing.
//!
//! The router only knows pool names. Turning a pool name into an address is
//! the balancer's job; [`RoundRobinBalancer`] is a static, lock-free
//! implementation configured at startup.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Resolves a pool name to one member address per call.
pub trait LoadBalancer: Send + Sync {
    /// Base URL of the member to use, or `None` when the pool has no member.
    fn choose(&self, pool: &str) -> Option<String>;
}

/// Members of one pool plus its rotation cursor.
#[derive(Debug)]
struct UpstreamPool {
    members: Vec<String>,
    cursor: AtomicUsize,
}

/// Round-robin over statically configured members.
#[derive(Debug, Default)]
pub struct RoundRobinBalancer {
    pools: DashMap<String, UpstreamPool>,
}

impl RoundRobinBalancer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the members of a pool.
    pub fn register(&self, pool: &str, members: Vec<String>) {
        let members: Vec<String> = members
            .into_iter()
            .map(|m| m.trim().trim_end_matches('/').to_string())
            .filter(|m| !m.is_empty())
            .collect();

        info!("Pool {} registered with {} member(s)", pool, members.len());
        self.pools.insert(
            pool.to_string(),
            UpstreamPool {
                members,
                cursor: AtomicUsize::new(0),
            },
        );
    }

    /// Number of members in a pool (0 for unknown pools).
    pub fn member_count(&self, pool: &str) -> usize {
        self.pools.get(pool).map_or(0, |p| p.members.len())
    }
}

impl LoadBalancer for RoundRobinBalancer {
    fn choose(&self, pool: &str) -> Option<String> {
        let pool = self.pools.get(pool)?;
        if pool.members.is_empty() {
            return None;
        }
        let index = pool.cursor.fetch_add(1, Ordering::Relaxed) % pool.members.len();
        Some(pool.members[index].clone())
    }
}
