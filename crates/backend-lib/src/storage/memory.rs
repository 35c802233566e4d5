//! In-process stores, used when no persistent backend is configured.
//!
//! Data lives as long as the process and is not shared between instances.
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::RwLock;
use portal_common::{Appointment, ClinicalNote};

use super::{AppointmentStore, Backend, NoteStore, StoreError, UserRecord, UserStore, DUPLICATE_EMAIL};

/// Users keyed by (normalised) email; the map entry lock makes
/// check-and-insert atomic.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    by_email: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryUserStore {
    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.by_email.get(email).map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .by_email
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.value().clone()))
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(DUPLICATE_EMAIL.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryAppointmentStore {
    rows: RwLock<Vec<Appointment>>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryAppointmentStore {
    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        self.rows.write().push(appointment.clone());
        Ok(appointment)
    }

    async fn list_for_patient(&self, paciente_id: &str) -> Result<Vec<Appointment>, StoreError> {
        let mut mine: Vec<Appointment> = self
            .rows
            .read()
            .iter()
            .filter(|c| c.paciente_id == paciente_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.fecha_hora.cmp(&a.fecha_hora));
        Ok(mine)
    }
}

#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    rows: RwLock<Vec<ClinicalNote>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryNoteStore {
    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: ClinicalNote) -> Result<ClinicalNote, StoreError> {
        self.rows.write().push(note.clone());
        Ok(note)
    }

    async fn list_for_appointment(&self, cita_id: &str) -> Result<Vec<ClinicalNote>, StoreError> {
        // Walk newest insert first so equal timestamps keep insertion recency.
        let mut notes: Vec<ClinicalNote> = self
            .rows
            .read()
            .iter()
            .rev()
            .filter(|n| n.cita_id == cita_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }
}
