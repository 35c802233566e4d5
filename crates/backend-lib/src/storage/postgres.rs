// ============================
// portal-backend/src/storage/postgres.rs
// ============================
//! Postgres-backed user and appointment stores.
//!
//! The pool is created lazily: building a store never touches the network, so
//! the HTTP listener comes up even while the database is unreachable. Every
//! query is bounded by the configured store timeout.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_common::Appointment;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{with_timeout, AppointmentStore, Backend, StoreError, UserRecord, UserStore, DUPLICATE_EMAIL};

/// Build a lazily connecting pool
pub fn lazy_pool(url: &str, max_connections: u32, timeout: Duration) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(timeout)
        .connect_lazy(url)?;
    Ok(pool)
}

async fn ping_pool(pool: &PgPool, timeout: Duration) -> Result<(), StoreError> {
    with_timeout(timeout, async {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok::<_, StoreError>(())
    })
    .await
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    rol: String,
    nombre: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let rol = row
            .rol
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("user {}: {e}", row.id)))?;
        Ok(UserRecord {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            rol,
            nombre: row.nombre,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn fetch_one_by(&self, sql: &'static str, key: &str) -> Result<Option<UserRecord>, StoreError> {
        with_timeout(self.timeout, async {
            let row: Option<UserRow> = sqlx::query_as(sql).bind(key).fetch_optional(&self.pool).await?;
            row.map(UserRecord::try_from).transpose()
        })
        .await
    }
}

#[async_trait]
impl Backend for PgUserStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                email         TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                rol           TEXT NOT NULL,
                nombre        TEXT NOT NULL,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Older deployments created the table without the constraint.
        sqlx::query(
            r#"
            DO $$
            BEGIN
                IF NOT EXISTS (
                    SELECT 1 FROM pg_constraint WHERE conname = 'uq_users_email'
                ) THEN
                    ALTER TABLE users ADD CONSTRAINT uq_users_email UNIQUE (email);
                END IF;
            END
            $$
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        ping_pool(&self.pool, self.timeout).await
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.fetch_one_by(
            "SELECT id, email, password_hash, rol, nombre, created_at FROM users WHERE email = $1 LIMIT 1",
            email,
        )
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.fetch_one_by(
            "SELECT id, email, password_hash, rol, nombre, created_at FROM users WHERE id = $1",
            id,
        )
        .await
    }

    async fn insert(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        with_timeout(self.timeout, async {
            let row: UserRow = sqlx::query_as(
                r#"
                INSERT INTO users (id, email, password_hash, rol, nombre, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, email, password_hash, rol, nombre, created_at
                "#,
            )
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.rol.as_str())
            .bind(&user.nombre)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)?;
            UserRecord::try_from(row)
        })
        .await
    }
}

/// The unique constraint is the final word on email collisions.
fn map_insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(DUPLICATE_EMAIL.to_string())
        },
        _ => StoreError::Database(err),
    }
}

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    id: String,
    paciente_id: String,
    medico_id: String,
    fecha_hora: DateTime<Utc>,
    motivo: Option<String>,
    estado: String,
    created_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        Appointment {
            id: row.id,
            paciente_id: row.paciente_id,
            medico_id: row.medico_id,
            fecha_hora: row.fecha_hora,
            motivo: row.motivo,
            estado: row.estado,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgAppointmentStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgAppointmentStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl Backend for PgAppointmentStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS citas (
                id          TEXT PRIMARY KEY,
                paciente_id TEXT NOT NULL,
                medico_id   TEXT NOT NULL,
                fecha_hora  TIMESTAMPTZ NOT NULL,
                motivo      TEXT,
                estado      TEXT NOT NULL DEFAULT 'pendiente',
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_citas_paciente ON citas (paciente_id)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        ping_pool(&self.pool, self.timeout).await
    }
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        with_timeout(self.timeout, async {
            let row: AppointmentRow = sqlx::query_as(
                r#"
                INSERT INTO citas (id, paciente_id, medico_id, fecha_hora, motivo, estado, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, paciente_id, medico_id, fecha_hora, motivo, estado, created_at
                "#,
            )
            .bind(&appointment.id)
            .bind(&appointment.paciente_id)
            .bind(&appointment.medico_id)
            .bind(appointment.fecha_hora)
            .bind(&appointment.motivo)
            .bind(&appointment.estado)
            .bind(appointment.created_at)
            .fetch_one(&self.pool)
            .await?;
            Ok::<_, StoreError>(row.into())
        })
        .await
    }

    async fn list_for_patient(&self, paciente_id: &str) -> Result<Vec<Appointment>, StoreError> {
        with_timeout(self.timeout, async {
            let rows: Vec<AppointmentRow> = sqlx::query_as(
                r#"
                SELECT id, paciente_id, medico_id, fecha_hora, motivo, estado, created_at
                FROM citas
                WHERE paciente_id = $1
                ORDER BY fecha_hora DESC
                "#,
            )
            .bind(paciente_id)
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, StoreError>(rows.into_iter().map(Appointment::from).collect())
        })
        .await
    }
}
