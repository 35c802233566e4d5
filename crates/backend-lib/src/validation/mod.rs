// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation module.
//!
//! Every body is checked here before it reaches a store. The messages are the
//! ones returned to clients with a 400.

use chrono::{DateTime, Utc};
use portal_common::{CreateAppointmentRequest, CreateNoteRequest, LoginRequest, RegisterRequest, Role};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_PASSWORD_LENGTH: usize = 1024;
const MAX_NAME_LENGTH: usize = 200;

/// Display name used when registration omits `nombre`
pub const DEFAULT_DISPLAY_NAME: &str = "Usuario";

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap());
static RECORD_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid rol: must be one of {}", Role::ALLOWED.join(", "))]
    InvalidRole,

    #[error("Invalid nombre: {0}")]
    InvalidName(String),

    #[error("medicoId and fechaHora are required")]
    MissingAppointmentFields,

    #[error("Invalid fechaHora: expected an RFC 3339 timestamp")]
    InvalidTimestamp,

    #[error("At least one of S, O, A, P is required")]
    EmptyNote,

    #[error("Invalid id: {0}")]
    InvalidRecordId(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A registration that passed validation, email normalised
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationInput {
    pub email: String,
    pub password: String,
    pub rol: Role,
    pub nombre: String,
}

impl std::fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("email", &self.email)
            .field("rol", &self.rol)
            .field("nombre", &self.nombre)
            .finish_non_exhaustive()
    }
}

/// A validated appointment body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentInput {
    pub medico_id: String,
    pub fecha_hora: DateTime<Utc>,
    pub motivo: Option<String>,
}

/// A validated SOAP note body. Empty sections are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

/// Trim and lowercase an email so lookups and uniqueness ignore case
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate an email address (already normalised)
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Email address must look like local@domain".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a password. Only presence and an upper bound are enforced.
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> ValidationResult<(String, String)> {
    let email = email.map(|e| normalize_email(&e)).unwrap_or_default();
    let password = password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok((email, password))
}

/// Validate a registration body
pub fn validate_registration(request: RegisterRequest) -> ValidationResult<RegistrationInput> {
    let (email, password) = required_credentials(request.email, request.password)?;
    validate_email(&email)?;
    validate_password(&password)?;

    let rol = match non_empty(request.rol) {
        Some(rol) => rol.trim().parse::<Role>().map_err(|_| ValidationError::InvalidRole)?,
        None => Role::default(),
    };

    let nombre = match non_empty(request.nombre) {
        Some(nombre) => nombre.trim().to_string(),
        None => DEFAULT_DISPLAY_NAME.to_string(),
    };
    if nombre.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "nombre cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(RegistrationInput {
        email,
        password,
        rol,
        nombre,
    })
}

/// Validate a login body, returning the normalised email and the password.
/// Only presence is checked: a malformed email or an oversized password must
/// fail the credential check like any other wrong pair.
pub fn validate_login(request: LoginRequest) -> ValidationResult<(String, String)> {
    required_credentials(request.email, request.password)
}

/// Validate an appointment body
pub fn validate_appointment(request: CreateAppointmentRequest) -> ValidationResult<AppointmentInput> {
    let medico_id = non_empty(request.medico_id).ok_or(ValidationError::MissingAppointmentFields)?;
    let fecha_hora = non_empty(request.fecha_hora).ok_or(ValidationError::MissingAppointmentFields)?;

    let fecha_hora = DateTime::parse_from_rfc3339(fecha_hora.trim())
        .map_err(|_| ValidationError::InvalidTimestamp)?
        .with_timezone(&Utc);

    Ok(AppointmentInput {
        medico_id: medico_id.trim().to_string(),
        fecha_hora,
        motivo: non_empty(request.motivo),
    })
}

/// Validate a SOAP note body
pub fn validate_note(request: CreateNoteRequest) -> ValidationResult<NoteInput> {
    let note = NoteInput {
        subjective: non_empty(request.subjective),
        objective: non_empty(request.objective),
        assessment: non_empty(request.assessment),
        plan: non_empty(request.plan),
    };

    if note.subjective.is_none()
        && note.objective.is_none()
        && note.assessment.is_none()
        && note.plan.is_none()
    {
        return Err(ValidationError::EmptyNote);
    }

    Ok(note)
}

/// Validate an id taken from a URL path. Ids also name note directories on disk.
pub fn validate_record_id(id: &str) -> ValidationResult<&str> {
    if !RECORD_ID_REGEX.is_match(id) {
        return Err(ValidationError::InvalidRecordId(
            "ids may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(id)
}
