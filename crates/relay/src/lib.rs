//! # Quill Relay
//!
//! Backend for the paraphrasing tool. Validates paraphrase requests, applies
//! the per-client rate limit and origin policy, and forwards the request to an
//! OpenAI-compatible chat-completion API without exposing the credential.
//!
//! ## Request flow
//! ```text
//! Client → origin gate → CORS → rate limit → /api/paraphrase → Provider
//! ```

pub mod config;
pub mod error;
pub mod limiter;
pub mod middleware;
pub mod prompt;
pub mod provider;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;
