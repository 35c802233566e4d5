// =============
// portal-backend/src/auth/service.rs
// =============
//! This module defines the `AuthService` trait, the credential flows behind
//! the auth service's HTTP surface.
use async_trait::async_trait;
use portal_common::{Claims, LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse};

use crate::error::AppError;
use crate::storage::Backend;

#[async_trait]
pub trait AuthService: Backend {
    /// Validate, hash and store a new user, then issue a token for it
    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, AppError>;

    /// Exchange email and password for a session token
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError>;

    /// Public projection of the caller, refreshed from the store when possible
    async fn current_user(&self, claims: &Claims) -> PublicUser;
}
