//! In-process fixed-window counters.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use super::{RateLimitDecision, RateLimitError, RateLimitStore};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: Instant,
}

struct Counters {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Per-key counters held in this process.
///
/// A key's window opens on its first request and lasts `window`. Expired
/// windows are replaced on the key's next request and dropped by a sweep that
/// runs at most once per window length.
/// Note: limits are per-process, not shared across instances.
pub struct InMemoryRateLimitStore {
    max_requests: u32,
    window: Duration,
    counters: Mutex<Counters>,
}

impl InMemoryRateLimitStore {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            counters: Mutex::new(Counters {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Number of keys with a live or not-yet-swept window
    pub fn tracked_keys(&self) -> usize {
        self.counters
            .lock()
            .map(|counters| counters.windows.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let now = Instant::now();
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| RateLimitError::Backend("rate limit counters poisoned".to_string()))?;

        if now.duration_since(counters.last_sweep) >= self.window {
            let before = counters.windows.len();
            counters.windows.retain(|_, w| w.resets_at > now);
            counters.last_sweep = now;
            tracing::debug!(
                dropped = before - counters.windows.len(),
                "Swept expired rate-limit windows"
            );
        }

        let fresh = Window {
            count: 0,
            resets_at: now + self.window,
        };
        let window = counters.windows.entry(key.to_string()).or_insert(fresh);
        if window.resets_at <= now {
            *window = fresh;
        }
        window.count = window.count.saturating_add(1);

        Ok(RateLimitDecision::from_count(
            window.count,
            self.max_requests,
            window.resets_at - now,
        ))
    }
}
