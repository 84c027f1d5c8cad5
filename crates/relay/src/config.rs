//! Configuration management for the relay.
//!
//! Resolved once at startup: built-in defaults, then the optional TOML file,
//! then environment/CLI overrides. Handlers only ever see the frozen result.

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use quill_common::constants::{
    DEFAULT_LISTEN_ADDR, MAX_WORDS, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS, origins,
    upstream,
};

/// Deployment mode. Selects the CORS origin set and error verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Provider credential. Never printed.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Deployment mode
    #[serde(default)]
    pub environment: Environment,

    /// Completion provider credential. Absent is allowed; paraphrase calls then fail with 500.
    #[serde(default)]
    pub openai_api_key: Option<ApiKey>,

    /// Server-side word ceiling
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Completion provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Allowed browser origins
    #[serde(default)]
    pub cors: CorsConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Prebuilt front-end bundle
    #[serde(default)]
    pub assets: AssetsConfig,
}

/// Completion provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// API root; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Outbound request timeout in seconds (0 disables it)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Allowed origins per deployment mode
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_production_origins")]
    pub production_origins: Vec<String>,

    #[serde(default = "default_development_origins")]
    pub development_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            production_origins: default_production_origins(),
            development_origins: default_development_origins(),
        }
    }
}

/// Where rate-limit counters live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    #[default]
    Memory,
    Redis,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per window per client
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds
    #[serde(default = "default_window")]
    pub window_secs: u64,

    /// Take the client address from the last X-Forwarded-For hop
    #[serde(default = "default_trust_proxy")]
    pub trust_proxy: bool,

    #[serde(default)]
    pub backend: RateLimitBackend,

    /// Required when `backend = "redis"`
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window(),
            trust_proxy: default_trust_proxy(),
            backend: RateLimitBackend::default(),
            redis_url: None,
        }
    }
}

/// Front-end bundle location
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_max_words() -> usize { MAX_WORDS }
fn default_base_url() -> String { upstream::DEFAULT_BASE_URL.to_string() }
fn default_model() -> String { upstream::DEFAULT_MODEL.to_string() }
fn default_temperature() -> f32 { upstream::DEFAULT_TEMPERATURE }
fn default_max_tokens() -> u32 { upstream::DEFAULT_MAX_TOKENS }
fn default_timeout() -> u64 { upstream::DEFAULT_TIMEOUT_SECS }
fn default_production_origins() -> Vec<String> { origins::PRODUCTION.iter().map(|o| o.to_string()).collect() }
fn default_development_origins() -> Vec<String> { origins::DEVELOPMENT.iter().map(|o| o.to_string()).collect() }
fn default_max_requests() -> u32 { RATE_LIMIT_MAX_REQUESTS }
fn default_window() -> u64 { RATE_LIMIT_WINDOW_SECS } // 15 minutes
fn default_trust_proxy() -> bool { true }
fn default_dist_dir() -> String { "dist".to_string() }

/// Values taken from the environment or command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen_addr: Option<String>,
    pub port: Option<u16>,
    pub environment: Option<Environment>,
    pub openai_api_key: Option<String>,
    pub redis_url: Option<String>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(ref listen) = self.listen_addr {
            config.listen_addr = listen.clone();
        }
        if let Some(port) = self.port {
            let host = config
                .listen_addr
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            config.listen_addr = format!("{host}:{port}");
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(ref key) = self.openai_api_key {
            config.openai_api_key = Some(ApiKey::new(key.clone()));
        }
        if let Some(ref redis_url) = self.redis_url {
            config.rate_limit.redis_url = Some(redis_url.clone());
        }
    }
}

impl AppConfig {
    /// Load configuration from file, with environment/CLI overrides
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        };

        overrides.apply(&mut config);
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Origins accepted in the current deployment mode
    pub fn allowed_origins(&self) -> &[String] {
        if self.environment.is_production() {
            &self.cors.production_origins
        } else {
            &self.cors.development_origins
        }
    }

    /// Settings that are valid but risky for the current deployment mode
    pub fn deployment_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.environment.is_production() && self.rate_limit.trust_proxy {
            warnings.push(
                "rate_limit.trust_proxy is on: clients are keyed by X-Forwarded-For, \
                 so the relay must sit behind exactly one proxy that sets it",
            );
        }
        warnings
    }

    fn normalize(&mut self) {
        for origin in self
            .cors
            .production_origins
            .iter_mut()
            .chain(self.cors.development_origins.iter_mut())
        {
            *origin = origin.trim().trim_end_matches('/').to_string();
        }

        self.upstream.base_url = self.upstream.base_url.trim_end_matches('/').to_string();

        if self
            .openai_api_key
            .as_ref()
            .is_some_and(|key| key.expose().trim().is_empty())
        {
            self.openai_api_key = None;
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.max_words > 0, "max_words must be greater than zero");
        ensure!(
            self.rate_limit.max_requests > 0,
            "rate_limit.max_requests must be greater than zero"
        );
        ensure!(
            self.rate_limit.window_secs > 0,
            "rate_limit.window_secs must be greater than zero"
        );
        ensure!(
            (0.0..=2.0).contains(&self.upstream.temperature),
            "upstream.temperature must be within 0.0..=2.0"
        );
        ensure!(
            self.rate_limit.backend != RateLimitBackend::Redis
                || self.rate_limit.redis_url.is_some(),
            "rate_limit.redis_url is required for the redis backend"
        );
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            environment: Environment::default(),
            openai_api_key: None,
            max_words: default_max_words(),
            upstream: UpstreamConfig::default(),
            cors: CorsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}
