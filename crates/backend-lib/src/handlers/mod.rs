// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers, one module per service.
use axum::extract::FromRequest;

use crate::error::AppError;

pub mod appointments;
pub mod auth;
pub mod health;
pub mod notes;

/// `axum::Json` whose rejections use the portal error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
