//! Redis-backed counters shared by every relay instance.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ::redis::AsyncCommands;
use ::redis::aio::ConnectionManager;
use std::time::Duration;

use super::{RateLimitDecision, RateLimitError, RateLimitStore};
use quill_common::constants::redis_keys::RATELIMIT_PREFIX;

/// Counters stored as `ratelimit:{key}` with the window as the key's TTL.
pub struct RedisRateLimitStore {
    /// Redis connection manager (auto-reconnecting)
    redis: ConnectionManager,
    max_requests: u32,
    window_secs: u64,
}

impl RedisRateLimitStore {
    pub async fn connect(redis_url: &str, max_requests: u32, window_secs: u64) -> Result<Self> {
        let client =
            ::redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let redis = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Self {
            redis,
            max_requests,
            window_secs,
        })
    }
}

fn backend(err: ::redis::RedisError) -> RateLimitError {
    RateLimitError::Backend(err.to_string())
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let key = format!("{RATELIMIT_PREFIX}{key}");
        let mut conn = self.redis.clone();
        let window = self.window_secs as i64;

        // INCR is atomic across instances
        let count: u32 = conn.incr(&key, 1).await.map_err(backend)?;

        // Set expiry on first request
        if count == 1 {
            conn.expire::<_, ()>(&key, window).await.map_err(backend)?;
        }

        let mut ttl: i64 = conn.ttl(&key).await.map_err(backend)?;
        if ttl < 0 {
            // Counter lost its expiry (EXPIRE never ran); restart the window
            conn.expire::<_, ()>(&key, window).await.map_err(backend)?;
            ttl = window;
        }

        Ok(RateLimitDecision::from_count(
            count,
            self.max_requests,
            Duration::from_secs(ttl as u64),
        ))
    }
}
