// ============================
// portal-backend/src/storage/file.rs
// ============================
//! Flat-file document store for clinical notes.
//!
//! Each note is one JSON document under `<root>/notes/<cita_id>/<note_id>.json`,
//! so the appointment id plays the role of a partition key. Callers must pass
//! validated appointment ids (see [`crate::validation::validate_record_id`]).
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use portal_common::ClinicalNote;
use tokio::fs as tokio_fs;

use super::{with_timeout, Backend, NoteStore, StoreError};

#[derive(Clone, Debug)]
pub struct FileNoteStore {
    root: PathBuf,
    timeout: Duration,
}

impl FileNoteStore {
    pub fn new<P: AsRef<Path>>(root: P, timeout: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            timeout,
        }
    }

    fn notes_dir(&self) -> PathBuf {
        self.root.join("notes")
    }

    fn partition(&self, cita_id: &str) -> PathBuf {
        self.notes_dir().join(cita_id)
    }
}

#[async_trait]
impl Backend for FileNoteStore {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn init(&self) -> Result<(), StoreError> {
        tokio_fs::create_dir_all(self.notes_dir()).await?;
        Ok(())
    }

    /// The root must exist; the `notes` directory below it is created by `init`
    /// or on the first insert.
    async fn ping(&self) -> Result<(), StoreError> {
        with_timeout(self.timeout, async {
            let meta = tokio_fs::metadata(&self.root).await?;
            if meta.is_dir() {
                Ok(())
            } else {
                Err(StoreError::Corrupt(format!("{} is not a directory", self.root.display())))
            }
        })
        .await
    }
}

#[async_trait]
impl NoteStore for FileNoteStore {
    /// Write the note through a temp file so readers never see half a document.
    async fn insert(&self, note: ClinicalNote) -> Result<ClinicalNote, StoreError> {
        with_timeout(self.timeout, async {
            let dir = self.partition(&note.cita_id);
            tokio_fs::create_dir_all(&dir).await?;

            let json = serde_json::to_vec_pretty(&note)?;
            let tmp = dir.join(format!(".{}.json.tmp", note.id));
            let path = dir.join(format!("{}.json", note.id));
            tokio_fs::write(&tmp, json).await?;
            tokio_fs::rename(&tmp, &path).await?;
            Ok::<_, StoreError>(note)
        })
        .await
    }

    async fn list_for_appointment(&self, cita_id: &str) -> Result<Vec<ClinicalNote>, StoreError> {
        with_timeout(self.timeout, async {
            let dir = self.partition(cita_id);
            if !tokio_fs::try_exists(&dir).await? {
                return Ok(Vec::new());
            }

            let mut notes = Vec::new();
            let mut entries = tokio_fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let content = tokio_fs::read(&path).await?;
                let note: ClinicalNote = serde_json::from_slice(&content)?;
                notes.push(note);
            }

            // Directory order is arbitrary. Ids are random, so notes sharing a
            // timestamp come back in a stable but not insertion order.
            notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
            Ok::<_, StoreError>(notes)
        })
        .await
    }
}
