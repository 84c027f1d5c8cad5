//! Rate-limit counter stores.
//!
//! Fixed windows per client key. The store is injected into the app state so a
//! single-process deployment can keep counters in memory while a multi-process
//! one shares them through Redis.

mod memory;
mod redis;

pub use self::memory::InMemoryRateLimitStore;
pub use self::redis::RedisRateLimitStore;

use async_trait::async_trait;
use std::time::Duration;

/// Outcome of counting one request against its key's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Decision for the `count`-th request of a window.
    pub fn from_count(count: u32, limit: u32, reset_after: Duration) -> Self {
        Self {
            allowed: count <= limit,
            limit,
            remaining: limit.saturating_sub(count),
            reset_after,
        }
    }

    /// Whole seconds until reset, rounded up
    pub fn reset_secs(&self) -> u64 {
        self.reset_after.as_secs_f64().ceil() as u64
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Counter store keyed by client identity.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `key` and report whether it is within the ceiling.
    /// Every call increments; concurrent calls never lose an increment.
    async fn hit(&self, key: &str) -> Result<RateLimitDecision, RateLimitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_from_count() {
        let at_limit = RateLimitDecision::from_count(50, 50, Duration::from_secs(10));
        assert!(at_limit.allowed);
        assert_eq!(at_limit.remaining, 0);

        let over = RateLimitDecision::from_count(51, 50, Duration::from_millis(1500));
        assert!(!over.allowed);
        assert_eq!(over.remaining, 0);
        assert_eq!(over.reset_secs(), 2);
    }
}
