// ============================
// portal-backend/src/router.rs
// ============================
//! Per-service routers.
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::AuthService;
use crate::config::Settings;
use crate::handlers::{appointments, auth, health::health, notes};
use crate::middleware::require_session;
use crate::storage::{AppointmentStore, NoStore, NoteStore};
use crate::AppState;

/// CORS policy: mirror the caller's origin with credentials, or allow nothing
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    if settings.cors_allow_any_origin {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
    }
}

fn finish(router: Router, settings: &Settings) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(settings))
}

/// Auth service: register, login and the caller's profile
pub fn auth_router(state: Arc<AppState<dyn AuthService>>) -> Router {
    let protected: Router<Arc<AppState<dyn AuthService>>> = Router::new()
        .route("/me", get(auth::me))
        .route("/auth/me", get(auth::me))
        .route_layer(from_fn_with_state(state.tokens.clone(), require_session));

    let router = Router::new()
        .route("/health", get(health::<dyn AuthService>))
        .route("/auth/register", post(auth::register))
        .route("/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/login", post(auth::login))
        .merge(protected)
        .with_state(state.clone());

    finish(router, &state.settings)
}

/// Appointment service
pub fn citas_router(state: Arc<AppState<dyn AppointmentStore>>) -> Router {
    let router = Router::new()
        .route("/citas", post(appointments::create).get(appointments::list))
        .route_layer(from_fn_with_state(state.tokens.clone(), require_session))
        .route("/health", get(health::<dyn AppointmentStore>))
        .with_state(state.clone());

    finish(router, &state.settings)
}

/// Clinical notes service
pub fn notas_router(state: Arc<AppState<dyn NoteStore>>) -> Router {
    let router = Router::new()
        .route("/citas/{id}/nota", post(notes::create).get(notes::list))
        .route_layer(from_fn_with_state(state.tokens.clone(), require_session))
        .route("/health", get(health::<dyn NoteStore>))
        .with_state(state.clone());

    finish(router, &state.settings)
}

/// Notification stub: health only
pub fn notif_router(state: Arc<AppState<NoStore>>) -> Router {
    let router = Router::new()
        .route("/health", get(health::<NoStore>))
        .with_state(state.clone());

    finish(router, &state.settings)
}
