//! Appointment service handlers.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use portal_common::{Appointment, CreateAppointmentRequest, APPOINTMENT_PENDING};

use super::ApiJson;
use crate::error::AppError;
use crate::metrics;
use crate::middleware::Caller;
use crate::storage::{new_id, AppointmentStore};
use crate::validation::validate_appointment;
use crate::AppState;

pub type AppointmentState = Arc<AppState<dyn AppointmentStore>>;

/// `POST /citas`: book an appointment for the caller
pub async fn create(
    State(state): State<AppointmentState>,
    Caller(claims): Caller,
    ApiJson(body): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let input = validate_appointment(body)?;
    let appointment = Appointment {
        id: new_id('c'),
        paciente_id: claims.sub,
        medico_id: input.medico_id,
        fecha_hora: input.fecha_hora,
        motivo: input.motivo,
        estado: APPOINTMENT_PENDING.to_string(),
        created_at: Utc::now(),
    };

    let stored = state.store.insert(appointment).await?;
    metrics::incr(metrics::APPOINTMENT_CREATED);
    tracing::info!(cita_id = %stored.id, paciente_id = %stored.paciente_id, "appointment booked");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /citas`: the caller's appointments, latest first
pub async fn list(
    State(state): State<AppointmentState>,
    Caller(claims): Caller,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(state.store.list_for_patient(&claims.sub).await?))
}
