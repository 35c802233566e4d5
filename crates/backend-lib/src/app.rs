// ============================
// portal-backend/src/app.rs
// ============================
//! Service assembly: settings in, ready-to-serve router out.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;

use crate::auth::{AuthService, DefaultAuth, TokenService};
use crate::config::Settings;
use crate::router;
use crate::storage::{self, spawn_init, NoStore};
use crate::AppState;

/// The four portal services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Auth,
    Citas,
    Notas,
    Notif,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [Self::Auth, Self::Citas, Self::Notas, Self::Notif];

    /// Name reported by `/health` and used in logs
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Auth => "auth",
            ServiceKind::Citas => "citas",
            ServiceKind::Notas => "notas",
            ServiceKind::Notif => "notif",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown service `{s}`"))
    }
}

/// Build the router for `kind`. Stores are chosen here, once, and their
/// initialisation is spawned in the background so the caller can serve
/// immediately. Must run inside a Tokio runtime.
pub fn build(kind: ServiceKind, settings: Arc<Settings>) -> anyhow::Result<axum::Router> {
    let tokens = Arc::new(TokenService::from_settings(&settings));
    let service = kind.name();

    let router = match kind {
        ServiceKind::Auth => {
            let users = storage::user_store(&settings).context("creating user store")?;
            let auth = Arc::new(
                DefaultAuth::new(users, tokens.clone(), settings.hash_cost, settings.registration_token)
                    .context("preparing password hasher")?,
            );
            spawn_init(service, auth.clone());
            let auth: Arc<dyn AuthService> = auth;
            router::auth_router(Arc::new(AppState::new(service, settings, tokens, auth)))
        },
        ServiceKind::Citas => {
            let store = storage::appointment_store(&settings).context("creating appointment store")?;
            spawn_init(service, store.clone());
            router::citas_router(Arc::new(AppState::new(service, settings, tokens, store)))
        },
        ServiceKind::Notas => {
            let store = storage::note_store(&settings);
            spawn_init(service, store.clone());
            router::notas_router(Arc::new(AppState::new(service, settings, tokens, store)))
        },
        ServiceKind::Notif => {
            router::notif_router(Arc::new(AppState::new(service, settings, tokens, Arc::new(NoStore))))
        },
    };

    tracing::info!(service, "router ready");
    Ok(router)
}
