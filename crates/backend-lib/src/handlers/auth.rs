//! Auth service handlers.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use portal_common::{LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse};

use super::ApiJson;
use crate::auth::AuthService;
use crate::error::AppError;
use crate::middleware::Caller;
use crate::AppState;

pub type AuthState = Arc<AppState<dyn AuthService>>;

/// `POST /auth/register`
pub async fn register(
    State(state): State<AuthState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = state.store.register(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.store.login(body).await?))
}

/// `GET /me`
pub async fn me(State(state): State<AuthState>, Caller(claims): Caller) -> Json<MeResponse> {
    let user = state.store.current_user(&claims).await;
    Json(MeResponse { user })
}
