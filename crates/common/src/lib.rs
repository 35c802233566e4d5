// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared by the portal services and their clients.
//! This module defines the JSON bodies exchanged over HTTP and the token claims.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role granted to a user at registration.
///
/// The wire values are the ones the portal front-end already sends.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// A patient booking appointments
    #[default]
    #[serde(rename = "paciente")]
    Patient,
    /// A clinician writing notes
    #[serde(rename = "medico")]
    Clinician,
    /// Portal administrator
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// Every accepted role, in wire form
    pub const ALLOWED: [&'static str; 3] = ["paciente", "medico", "admin"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "paciente",
            Role::Clinician => "medico",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is outside [`Role::ALLOWED`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role `{}`", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paciente" => Ok(Role::Patient),
            "medico" => Ok(Role::Clinician),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Discriminates full session tokens from registration acknowledgements
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Session token accepted by every protected endpoint
    Access,
    /// Short-lived token that only confirms a registration
    Register,
}

/// Claims carried inside a bearer token
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub rol: Role,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TokenKind>,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// User as seen by callers. The password hash never leaves the store layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub rol: Role,
    pub nombre: String,
    /// Unknown when the projection was rebuilt from token claims alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PublicUser {
    /// Projection rebuilt from token claims, used when the store cannot be read
    pub fn from_claims(claims: &Claims) -> Self {
        PublicUser {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            rol: claims.rol,
            nombre: claims.nombre.clone(),
            created_at: None,
        }
    }
}

/// Body of `POST /auth/register`
#[derive(Deserialize, Default, Clone)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub rol: Option<String>,
    pub nombre: Option<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("rol", &self.rol)
            .field("nombre", &self.nombre)
            .finish()
    }
}

/// Body of `POST /auth/login`
#[derive(Deserialize, Default, Clone)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response to a successful registration.
///
/// Exactly one of `access_token` / `register_token` is set, depending on
/// which token kind the auth service is configured to hand out.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: PublicUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response to a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: PublicUser,
}

/// Response of `GET /me`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// Body of `POST /citas`
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub medico_id: Option<String>,
    /// RFC 3339 timestamp
    pub fecha_hora: Option<String>,
    pub motivo: Option<String>,
}

/// A booked appointment, owned by the patient who created it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub paciente_id: String,
    pub medico_id: String,
    pub fecha_hora: DateTime<Utc>,
    pub motivo: Option<String>,
    pub estado: String,
    pub created_at: DateTime<Utc>,
}

/// Status assigned to every new appointment
pub const APPOINTMENT_PENDING: &str = "pendiente";

/// Body of `POST /citas/:id/nota`, a SOAP note
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CreateNoteRequest {
    #[serde(rename = "S")]
    pub subjective: Option<String>,
    #[serde(rename = "O")]
    pub objective: Option<String>,
    #[serde(rename = "A")]
    pub assessment: Option<String>,
    #[serde(rename = "P")]
    pub plan: Option<String>,
}

/// A clinical note attached to an appointment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalNote {
    pub id: String,
    pub cita_id: String,
    pub autor_id: String,
    #[serde(rename = "S")]
    pub subjective: Option<String>,
    #[serde(rename = "O")]
    pub objective: Option<String>,
    #[serde(rename = "A")]
    pub assessment: Option<String>,
    #[serde(rename = "P")]
    pub plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `GET /health`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    /// Backing store: `postgres`, `file`, `memory`, `none` or `down`
    pub db: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
