use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use portal_common::{Claims, TokenKind};

use crate::auth::TokenService;
use crate::error::{AppError, INVALID_TOKEN, NO_TOKEN};
use crate::metrics;

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization: Bearer <token>` header. The scheme is
/// matched exactly and an empty token counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Session gate: verifies the bearer token and stores its claims in the
/// request extensions for [`Caller`].
pub async fn require_session(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        metrics::incr(metrics::GATE_REJECTED);
        return Err(AppError::Unauthorized(NO_TOKEN));
    };

    let claims = match tokens.verify(token) {
        Ok(claims) if claims.kind == Some(TokenKind::Access) => claims,
        Ok(claims) => {
            tracing::debug!(user_id = %claims.sub, kind = ?claims.kind, "token kind refused");
            metrics::incr(metrics::GATE_REJECTED);
            return Err(AppError::Unauthorized(INVALID_TOKEN));
        },
        Err(err) => {
            tracing::debug!(error = %err, "token rejected");
            metrics::incr(metrics::GATE_REJECTED);
            return Err(err.into());
        },
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Verified claims of the caller. Only available behind [`require_session`].
#[derive(Debug, Clone)]
pub struct Caller(pub Claims);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Caller)
            .ok_or(AppError::Unauthorized(NO_TOKEN))
    }
}
