//! `GET /health`, shared by every service.
use std::sync::Arc;

use axum::{extract::State, Json};
use portal_common::HealthResponse;

use crate::storage::{Backend, StoreError};
use crate::AppState;

/// Report liveness and whether the backing store answers. Never fails.
pub async fn health<S>(State(state): State<Arc<AppState<S>>>) -> Json<HealthResponse>
where
    S: Backend + ?Sized + 'static,
{
    let response = match state.store.ping().await {
        Ok(()) => HealthResponse {
            ok: true,
            service: state.service.to_string(),
            db: state.store.kind().to_string(),
            error: None,
        },
        Err(StoreError::NotConfigured(_)) => HealthResponse {
            ok: false,
            service: state.service.to_string(),
            db: "none".to_string(),
            error: Some("No database configured".to_string()),
        },
        Err(err) => {
            tracing::warn!(service = state.service, backend = state.store.kind(), error = %err, "health check failed");
            HealthResponse {
                ok: false,
                service: state.service.to_string(),
                db: "down".to_string(),
                error: Some("database unreachable".to_string()),
            }
        },
    };
    Json(response)
}
