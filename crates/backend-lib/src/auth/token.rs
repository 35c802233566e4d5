// ============================
// portal-backend/src/auth/token.rs
// ============================
//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs over [`Claims`]. Nothing is stored server side: a
//! token is valid while its signature checks out and `exp` is in the future.
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use portal_common::{Claims, PublicUser, TokenKind};
use thiserror::Error;

use crate::config::Settings;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token invalid")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and verifies tokens with one shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    register_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, register_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            register_ttl,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.jwt_secret.as_bytes(),
            settings.access_token_ttl(),
            settings.register_token_ttl(),
        )
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Register => self.register_ttl,
        }
    }

    /// Issue a token of `kind` for `user`
    pub fn issue(&self, user: &PublicUser, kind: TokenKind) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl(kind).as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            rol: user.rol,
            nombre: user.nombre.clone(),
            kind: Some(kind),
            iat,
            exp: iat.saturating_add(ttl),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims as-is
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
