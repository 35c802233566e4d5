// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the portal services.

pub mod auth_gate;

pub use auth_gate::{bearer_token, require_session, Caller};
