//! # Quill Form
//!
//! Client side of the paraphraser: form state and local validation, the text
//! CAPTCHA, and the relay client.

pub mod api;
pub mod captcha;
pub mod form;

pub use api::{ClientError, HttpRelayClient, RelayApi};
pub use form::{FormController, Submission};
