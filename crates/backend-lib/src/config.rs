// ============================
// portal-backend/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then the
//! bare variables the services have always read (`PORT`, `JWT_SECRET`,
//! `POSTGRES_URL`, `BCRYPT_ROUNDS`, `NOTES_DIR`), then `PORTAL_`-prefixed
//! variables, which win over everything else.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use portal_common::TokenKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;


/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

/// Signing secret used when none is configured. Only fit for local development.
pub const INSECURE_DEV_SECRET: &str = "dev-secret";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Legacy environment variables and the setting each one feeds
const LEGACY_ENV: [(&str, &str); 5] = [
    ("port", "port"),
    ("jwt_secret", "jwt_secret"),
    ("postgres_url", "postgres_url"),
    ("bcrypt_rounds", "hash_cost"),
    ("notes_dir", "notes_dir"),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to read settings: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application settings shared by every service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Interface to bind
    pub host: IpAddr,
    /// Port to bind
    pub port: u16,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    /// HS256 signing secret shared by all services
    pub jwt_secret: String,
    /// Lifetime of session tokens, in seconds
    pub access_token_ttl_secs: u64,
    /// Lifetime of registration acknowledgement tokens, in seconds
    pub register_token_ttl_secs: u64,
    /// Which token kind a successful registration hands out
    pub registration_token: TokenKind,
    /// Password hashing work factor (scrypt `log_n`)
    pub hash_cost: u8,
    /// Postgres connection string for users and appointments
    pub postgres_url: Option<String>,
    /// Directory of the file-backed note store
    pub notes_dir: Option<PathBuf>,
    /// Upper bound on acquiring a connection or finishing a file operation
    pub db_timeout_secs: u64,
    pub db_max_connections: u32,
    /// Serve from process memory when no store is configured
    pub memory_fallback: bool,
    /// Mirror any request origin in CORS responses, credentials included
    pub cors_allow_any_origin: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            jwt_secret: INSECURE_DEV_SECRET.to_string(),
            access_token_ttl_secs: 8 * 60 * 60,
            register_token_ttl_secs: 10 * 60,
            registration_token: TokenKind::Access,
            hash_cost: 10,
            postgres_url: None,
            notes_dir: None,
            db_timeout_secs: 5,
            db_max_connections: 5,
            memory_fallback: true,
            cors_allow_any_origin: true,
        }
    }
}

impl Settings {
    /// Load settings from `portal.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(Toml::file(DEFAULT_CONFIG_FILE)).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an explicit config file, which must exist
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let settings: Settings = Self::figment(Toml::file(path)).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(file: figment::providers::Data<Toml>) -> Figment {
        let legacy = Env::raw()
            .only(&LEGACY_ENV.map(|(var, _)| var))
            .map(|key| {
                LEGACY_ENV
                    .iter()
                    .find(|(var, _)| key == *var)
                    .map_or_else(|| key.as_str().to_owned(), |(_, field)| (*field).to_owned())
                    .into()
            });

        Figment::from(Serialized::defaults(Settings::default()))
            .merge(file)
            .merge(legacy)
            .merge(Env::prefixed("PORTAL_"))
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {LOG_LEVELS:?}, got `{}`",
                self.log_level
            )));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("jwt_secret must not be empty".into()));
        }
        if self.access_token_ttl_secs == 0 || self.register_token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token lifetimes must be positive".into()));
        }
        if !(1..=20).contains(&self.hash_cost) {
            return Err(ConfigError::Invalid(format!(
                "hash_cost must be within 1..=20, got {}",
                self.hash_cost
            )));
        }
        if self.db_timeout_secs == 0 {
            return Err(ConfigError::Invalid("db_timeout_secs must be positive".into()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid("db_max_connections must be positive".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_secs)
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_ttl_secs)
    }

    pub fn register_token_ttl(&self) -> Duration {
        Duration::from_secs(self.register_token_ttl_secs)
    }

    /// True while the built-in development secret is in use
    pub fn uses_insecure_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEV_SECRET
    }
}
