// ============================
// portal-backend/src/lib.rs
// ============================
//! Shared backend for the portal services: token contract, session gate,
//! stores, handlers and per-service routers.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod telemetry;
pub mod validation;

use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Settings;

pub use crate::app::{build, ServiceKind};

/// Application state shared across all handlers of one service
pub struct AppState<S: ?Sized> {
    /// Service name reported by `/health`
    pub service: &'static str,
    /// Settings the service was started with
    pub settings: Arc<Settings>,
    /// Token verifier used by the session gate
    pub tokens: Arc<TokenService>,
    /// Storage backend, or the auth flows for the auth service
    pub store: Arc<S>,
}

impl<S: ?Sized> AppState<S> {
    /// Create a new application state
    pub fn new(
        service: &'static str,
        settings: Arc<Settings>,
        tokens: Arc<TokenService>,
        store: Arc<S>,
    ) -> Self {
        Self {
            service,
            settings,
            tokens,
            store,
        }
    }
}
