//! # Quill Common
//!
//! Shared types and utilities used by the relay service and the form client.
//!
//! ## Modules
//! - `types` - Request/response payloads and the option enums (Tone, Language, ...)
//! - `error` - Relay error taxonomy and the JSON error envelope
//! - `constants` - Shared limits, defaults, and header names

pub mod constants;
pub mod error;
pub mod types;

pub use error::{ErrorBody, RelayError};
pub use types::*;
