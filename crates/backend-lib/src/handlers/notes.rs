//! Clinical note service handlers.
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use portal_common::{ClinicalNote, CreateNoteRequest};

use super::ApiJson;
use crate::error::AppError;
use crate::metrics;
use crate::middleware::Caller;
use crate::storage::{new_id, NoteStore};
use crate::validation::{validate_note, validate_record_id};
use crate::AppState;

pub type NoteState = Arc<AppState<dyn NoteStore>>;

/// `POST /citas/{id}/nota`: attach a SOAP note written by the caller
pub async fn create(
    State(state): State<NoteState>,
    Path(cita_id): Path<String>,
    Caller(claims): Caller,
    ApiJson(body): ApiJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<ClinicalNote>), AppError> {
    validate_record_id(&cita_id)?;
    let input = validate_note(body)?;
    let note = ClinicalNote {
        id: new_id('n'),
        cita_id,
        autor_id: claims.sub,
        subjective: input.subjective,
        objective: input.objective,
        assessment: input.assessment,
        plan: input.plan,
        created_at: Utc::now(),
    };

    let stored = state.store.insert(note).await?;
    metrics::incr(metrics::NOTE_CREATED);
    tracing::info!(nota_id = %stored.id, cita_id = %stored.cita_id, "note stored");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /citas/{id}/nota`: notes of an appointment, newest first
pub async fn list(
    State(state): State<NoteState>,
    Path(cita_id): Path<String>,
    _caller: Caller,
) -> Result<Json<Vec<ClinicalNote>>, AppError> {
    validate_record_id(&cita_id)?;
    Ok(Json(state.store.list_for_appointment(&cita_id).await?))
}
