use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use portal_common::{Claims, LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse, TokenKind};
use tracing::instrument;
use zeroize::Zeroize;

use super::password::{hash_password, hash_password_secure, verify_password, PasswordError};
use super::{AuthService, TokenService};
use crate::error::{AppError, INVALID_CREDENTIALS};
use crate::metrics;
use crate::storage::{new_id, Backend, StoreError, UserRecord, UserStore, DUPLICATE_EMAIL};
use crate::validation::{validate_login, validate_registration};

const REGISTERED_MESSAGE: &str = "Registration successful. Sign in to continue.";

/// Credential flows over a [`UserStore`]
pub struct DefaultAuth {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hash_cost: u8,
    registration_kind: TokenKind,
    /// Verified against on unknown emails so both login failures cost one hash check
    dummy_hash: String,
}

impl DefaultAuth {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<TokenService>,
        hash_cost: u8,
        registration_kind: TokenKind,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hash_password(&new_id('x'), hash_cost)?;
        Ok(Self {
            users,
            tokens,
            hash_cost,
            registration_kind,
            dummy_hash,
        })
    }
}

async fn hash_off_reactor(mut password: String, cost: u8) -> Result<String, AppError> {
    Ok(tokio::task::spawn_blocking(move || hash_password_secure(&mut password, cost)).await??)
}

async fn verify_off_reactor(hash: String, mut password: String) -> Result<bool, AppError> {
    let matches = tokio::task::spawn_blocking(move || {
        let ok = verify_password(&hash, &password);
        password.zeroize();
        ok
    })
    .await?;
    Ok(matches)
}

#[async_trait]
impl Backend for DefaultAuth {
    fn kind(&self) -> &'static str {
        self.users.kind()
    }

    async fn init(&self) -> Result<(), StoreError> {
        self.users.init().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.users.ping().await
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    #[instrument(skip_all, fields(email = tracing::field::Empty))]
    async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, AppError> {
        let input = validate_registration(request)?;
        tracing::Span::current().record("email", input.email.as_str());

        // Early exit only; the store decides on insert.
        if self.users.find_by_email(&input.email).await?.is_some() {
            metrics::incr(metrics::REGISTER_DUPLICATE);
            return Err(AppError::DuplicateResource(DUPLICATE_EMAIL.to_string()));
        }

        let password_hash = hash_off_reactor(input.password, self.hash_cost).await?;
        let record = UserRecord {
            id: new_id('u'),
            email: input.email,
            password_hash,
            rol: input.rol,
            nombre: input.nombre,
            created_at: Utc::now(),
        };

        let stored = self.users.insert(record).await.map_err(|err| {
            if matches!(err, StoreError::Duplicate(_)) {
                metrics::incr(metrics::REGISTER_DUPLICATE);
            }
            AppError::from(err)
        })?;

        let user = stored.to_public();
        let token = self.tokens.issue(&user, self.registration_kind)?;
        metrics::incr(metrics::REGISTERED);
        tracing::info!(user_id = %user.id, rol = %user.rol, "user registered");

        Ok(match self.registration_kind {
            TokenKind::Access => RegisterResponse {
                user,
                access_token: Some(token),
                register_token: None,
                message: None,
            },
            TokenKind::Register => RegisterResponse {
                user,
                access_token: None,
                register_token: Some(token),
                message: Some(REGISTERED_MESSAGE.to_string()),
            },
        })
    }

    #[instrument(skip_all, fields(email = tracing::field::Empty))]
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let (email, password) = validate_login(request)?;
        tracing::Span::current().record("email", email.as_str());

        let user = self.users.find_by_email(&email).await?;
        let hash = user
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |u| u.password_hash.clone());
        let matches = verify_off_reactor(hash, password).await?;

        match user {
            Some(user) if matches => {
                let user = user.to_public();
                let access_token = self.tokens.issue(&user, TokenKind::Access)?;
                metrics::incr(metrics::LOGIN_OK);
                tracing::info!(user_id = %user.id, "login succeeded");
                Ok(LoginResponse { access_token, user })
            },
            _ => {
                metrics::incr(metrics::LOGIN_FAILED);
                tracing::warn!("login rejected");
                Err(AppError::Unauthorized(INVALID_CREDENTIALS))
            },
        }
    }

    async fn current_user(&self, claims: &Claims) -> PublicUser {
        match self.users.find_by_id(&claims.sub).await {
            Ok(Some(user)) => user.to_public(),
            Ok(None) => PublicUser::from_claims(claims),
            Err(err) => {
                tracing::warn!(user_id = %claims.sub, error = %err, "profile refresh failed, using token claims");
                PublicUser::from_claims(claims)
            },
        }
    }
}
