//! Application state and shared resources.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, RateLimitBackend};
use crate::limiter::{InMemoryRateLimitStore, RateLimitStore, RedisRateLimitStore};
use crate::provider::{CompletionProvider, OpenAiClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration resolved at startup
    pub config: Arc<AppConfig>,

    /// Completion backend
    pub provider: Arc<dyn CompletionProvider>,

    /// Rate-limit counters
    pub limiter: Arc<dyn RateLimitStore>,
}

impl AppState {
    /// Build the production state: OpenAI client plus the configured counter store
    pub async fn new(config: AppConfig) -> Result<Self> {
        let provider = OpenAiClient::new(&config.upstream)?;
        tracing::info!(model = %provider.model(), "Completion provider initialized");

        let rate = &config.rate_limit;
        let limiter: Arc<dyn RateLimitStore> = match (rate.backend, rate.redis_url.as_deref()) {
            (RateLimitBackend::Redis, Some(url)) => {
                let store =
                    RedisRateLimitStore::connect(url, rate.max_requests, rate.window_secs).await?;
                tracing::info!("Rate limiter using Redis");
                Arc::new(store)
            }
            _ => {
                tracing::info!("Rate limiter using in-memory counters");
                Arc::new(InMemoryRateLimitStore::new(
                    rate.max_requests,
                    Duration::from_secs(rate.window_secs),
                ))
            }
        };

        Ok(Self::with_parts(config, Arc::new(provider), limiter))
    }

    /// Assemble state from explicit parts
    pub fn with_parts(
        config: AppConfig,
        provider: Arc<dyn CompletionProvider>,
        limiter: Arc<dyn RateLimitStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            limiter,
        }
    }
}
