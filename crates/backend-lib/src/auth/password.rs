// ============================
// portal-backend/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Hashes are scrypt PHC strings (`$scrypt$ln=..,r=..,p=..$salt$hash`), so
//! verification reads its parameters from the hash itself and does not depend
//! on the currently configured work factor.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use thiserror::Error;
use zeroize::Zeroize;

/// Default work factor (scrypt `log_n`)
pub const DEFAULT_HASH_COST: u8 = 10;

const BLOCK_SIZE: u32 = 8;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("invalid work factor {0}")]
    InvalidCost(u8),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password using scrypt with `2^cost` iterations
pub fn hash_password(plain: &str, cost: u8) -> Result<String, PasswordError> {
    let params = Params::new(cost, BLOCK_SIZE, PARALLELISM, OUTPUT_LEN)
        .map_err(|_| PasswordError::InvalidCost(cost))?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash. A malformed hash never verifies.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String, cost: u8) -> Result<String, PasswordError> {
    let hash = hash_password(plain, cost);
    plain.zeroize();
    hash
}
