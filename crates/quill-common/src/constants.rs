//! Shared constants for Quill components.

/// Default relay HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3001";

/// Default relay base URL used by the form client
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

/// Word ceiling for a single paraphrase request
pub const MAX_WORDS: usize = 1000;

/// Requests allowed per client key in one window
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 50;

/// Rate-limit window length (15 minutes)
pub const RATE_LIMIT_WINDOW_SECS: u64 = 900;

/// Key used when the client address cannot be determined
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";

/// Completion provider defaults
pub mod upstream {
    /// OpenAI-compatible API root; `/chat/completions` is appended
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    /// Outbound request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}

/// Allowed browser origins per deployment mode
pub mod origins {
    pub const PRODUCTION: &[&str] = &["https://ai-paraphrasing-tool-pro-vite.vercel.app"];

    pub const DEVELOPMENT: &[&str] = &[
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://192.168.1.104:5173",
    ];
}

/// User-facing messages shared by relay and client
pub mod messages {
    pub const MISSING_FIELDS: &str = "Missing required fields";

    pub const RATE_LIMITED: &str = "Too many requests, please try again later.";

    pub const NO_CREDENTIAL: &str = "OpenAI API key not configured";

    pub const UPSTREAM_FALLBACK: &str = "OpenAI API request failed";

    pub const UPSTREAM_UNREACHABLE: &str = "Failed to reach the completion provider";

    pub const UPSTREAM_TIMEOUT: &str = "The completion provider did not respond in time";

    pub const UPSTREAM_MALFORMED: &str = "Invalid response format from OpenAI API";

    pub const ORIGIN_REJECTED: &str = "Origin not allowed";

    pub const INTERNAL: &str = "Internal Server Error";

    /// Word-ceiling message, e.g. "Text exceeds 1000 words limit"
    pub fn word_limit(max_words: usize) -> String {
        format!("Text exceeds {max_words} words limit")
    }
}

/// Redis key prefixes
pub mod redis_keys {
    /// Rate limit counters: ratelimit:{client_key}
    pub const RATELIMIT_PREFIX: &str = "ratelimit:";
}

/// HTTP header names (lowercase, as `HeaderName::from_static` requires)
pub mod headers {
    pub const RATELIMIT_LIMIT: &str = "ratelimit-limit";

    pub const RATELIMIT_REMAINING: &str = "ratelimit-remaining";

    pub const RATELIMIT_RESET: &str = "ratelimit-reset";

    pub const RATELIMIT_POLICY: &str = "ratelimit-policy";

    /// Proxy-supplied client address chain
    pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
}
