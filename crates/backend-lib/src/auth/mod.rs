// ============================
// portal-backend/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
mod service;
mod service_impl;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError, DEFAULT_HASH_COST};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{TokenError, TokenService};
