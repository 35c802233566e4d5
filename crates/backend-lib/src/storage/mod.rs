// ============================
// portal-backend/src/storage/mod.rs
// ============================
//! Storage abstraction.
//!
//! Every service talks to its records through one of the store traits below.
//! The concrete backend (Postgres, flat files, process memory, or nothing at
//! all) is picked once at startup by [`select`] and never inspected again.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_common::{Appointment, ClinicalNote, PublicUser, Role};
use thiserror::Error;
use uuid::Uuid;

pub mod file;
pub mod memory;
pub mod postgres;
pub mod select;
mod unconfigured;

pub use file::FileNoteStore;
pub use memory::{MemoryAppointmentStore, MemoryNoteStore, MemoryUserStore};
pub use postgres::{PgAppointmentStore, PgUserStore};
pub use select::{appointment_store, note_store, user_store};
pub use unconfigured::UnconfiguredStore;

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("{0} store is not configured")]
    NotConfigured(&'static str),

    #[error("store operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Message used for every email collision, whichever layer detects it
pub const DUPLICATE_EMAIL: &str = "Email already registered";

/// Lifecycle and health shared by every backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short backend name reported by `/health`
    fn kind(&self) -> &'static str;

    /// Create tables/directories. Runs once, after the listener is up.
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Cheap round trip proving the backend answers
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A user row, hash included. Only the auth flows ever see this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub rol: Role,
    pub nombre: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            rol: self.rol,
            nombre: self.nombre.clone(),
            created_at: Some(self.created_at),
        }
    }
}

/// Credential store
#[async_trait]
pub trait UserStore: Backend {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::Duplicate`] when the email
    /// is taken; this check is atomic with the insert.
    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError>;
}

/// Appointment store
#[async_trait]
pub trait AppointmentStore: Backend {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    /// Appointments of one patient, latest `fechaHora` first
    async fn list_for_patient(&self, paciente_id: &str) -> Result<Vec<Appointment>, StoreError>;
}

/// Clinical note store
#[async_trait]
pub trait NoteStore: Backend {
    async fn insert(&self, note: ClinicalNote) -> Result<ClinicalNote, StoreError>;

    /// Notes of one appointment, newest first
    async fn list_for_appointment(&self, cita_id: &str) -> Result<Vec<ClinicalNote>, StoreError>;
}

/// Backend used by the notification stub, which persists nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

#[async_trait]
impl Backend for NoStore {
    fn kind(&self) -> &'static str {
        "none"
    }
}

/// Generate a record id: one-letter entity prefix followed by a random UUID
pub fn new_id(prefix: char) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

/// Bound a store operation by `limit`
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout)?
}

/// Run store initialisation in the background, logging instead of failing
pub fn spawn_init<B>(service: &'static str, backend: Arc<B>) -> tokio::task::JoinHandle<()>
where
    B: Backend + ?Sized + 'static,
{
    tokio::spawn(async move {
        let kind = backend.kind();
        match backend.init().await {
            Ok(()) => tracing::info!(service, backend = kind, "store ready"),
            Err(err) => {
                tracing::error!(service, backend = kind, error = %err, "store init failed, serving anyway")
            },
        }
    })
}
