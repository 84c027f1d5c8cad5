//! Request gates that run before the handlers.

mod origin;
mod rate_limit;

pub use origin::{cors_layer, origin_gate};
pub use rate_limit::{client_key, rate_limit};
