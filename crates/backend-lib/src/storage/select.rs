//! Startup-time backend selection.
use std::sync::Arc;

use super::{
    postgres::lazy_pool, AppointmentStore, FileNoteStore, MemoryAppointmentStore, MemoryNoteStore,
    MemoryUserStore, NoteStore, PgAppointmentStore, PgUserStore, StoreError, UnconfiguredStore, UserStore,
};
use crate::config::Settings;

/// Credential store: Postgres when `postgres_url` is set, otherwise memory
/// (or nothing, when the fallback is disabled).
pub fn user_store(settings: &Settings) -> Result<Arc<dyn UserStore>, StoreError> {
    match settings.postgres_url.as_deref() {
        Some(url) => {
            let pool = lazy_pool(url, settings.db_max_connections, settings.db_timeout())?;
            Ok(Arc::new(PgUserStore::new(pool, settings.db_timeout())))
        },
        None if settings.memory_fallback => {
            tracing::warn!("postgres_url not set, users are kept in memory");
            Ok(Arc::new(MemoryUserStore::new()))
        },
        None => {
            tracing::warn!("postgres_url not set and memory fallback disabled");
            Ok(Arc::new(UnconfiguredStore::new("users")))
        },
    }
}

pub fn appointment_store(settings: &Settings) -> Result<Arc<dyn AppointmentStore>, StoreError> {
    match settings.postgres_url.as_deref() {
        Some(url) => {
            let pool = lazy_pool(url, settings.db_max_connections, settings.db_timeout())?;
            Ok(Arc::new(PgAppointmentStore::new(pool, settings.db_timeout())))
        },
        None if settings.memory_fallback => {
            tracing::warn!("postgres_url not set, appointments are kept in memory");
            Ok(Arc::new(MemoryAppointmentStore::new()))
        },
        None => {
            tracing::warn!("postgres_url not set and memory fallback disabled");
            Ok(Arc::new(UnconfiguredStore::new("appointments")))
        },
    }
}

/// Note store: flat-file documents when `notes_dir` is set, otherwise memory.
pub fn note_store(settings: &Settings) -> Arc<dyn NoteStore> {
    match settings.notes_dir.as_ref() {
        Some(dir) => Arc::new(FileNoteStore::new(dir, settings.db_timeout())),
        None if settings.memory_fallback => {
            tracing::warn!("notes_dir not set, notes are kept in memory");
            Arc::new(MemoryNoteStore::new())
        },
        None => {
            tracing::warn!("notes_dir not set and memory fallback disabled");
            Arc::new(UnconfiguredStore::new("notes"))
        },
    }
}
