//! Store that answers every call with [`StoreError::NotConfigured`].
//!
//! Selected when no backend is configured and the memory fallback is off, so
//! the service still starts and reports the missing dependency per request.
use async_trait::async_trait;
use portal_common::{Appointment, ClinicalNote};

use super::{AppointmentStore, Backend, NoteStore, StoreError, UserRecord, UserStore};

#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredStore {
    what: &'static str,
}

impl UnconfiguredStore {
    pub fn new(what: &'static str) -> Self {
        Self { what }
    }

    fn err<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::NotConfigured(self.what))
    }
}

#[async_trait]
impl Backend for UnconfiguredStore {
    fn kind(&self) -> &'static str {
        "none"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.err()
    }
}

#[async_trait]
impl UserStore for UnconfiguredStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.err()
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.err()
    }

    async fn insert(&self, _user: UserRecord) -> Result<UserRecord, StoreError> {
        self.err()
    }
}

#[async_trait]
impl AppointmentStore for UnconfiguredStore {
    async fn insert(&self, _appointment: Appointment) -> Result<Appointment, StoreError> {
        self.err()
    }

    async fn list_for_patient(&self, _paciente_id: &str) -> Result<Vec<Appointment>, StoreError> {
        self.err()
    }
}

#[async_trait]
impl NoteStore for UnconfiguredStore {
    async fn insert(&self, _note: ClinicalNote) -> Result<ClinicalNote, StoreError> {
        self.err()
    }

    async fn list_for_appointment(&self, _cita_id: &str) -> Result<Vec<ClinicalNote>, StoreError> {
        self.err()
    }
}
