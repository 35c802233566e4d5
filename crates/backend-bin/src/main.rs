use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use portal_backend::{
    config::Settings,
    telemetry::init_tracing,
    ServiceKind,
};
use tokio::net::TcpListener;

/// Run one of the portal services
#[derive(Parser, Debug)]
#[command(name = "portal", version, about)]
struct Cli {
    /// Service to run
    #[arg(value_enum)]
    service: Service,

    /// Config file (defaults to ./portal.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Service {
    Auth,
    Citas,
    Notas,
    Notif,
}

impl From<Service> for ServiceKind {
    fn from(service: Service) -> Self {
        match service {
            Service::Auth => ServiceKind::Auth,
            Service::Citas => ServiceKind::Citas,
            Service::Notas => ServiceKind::Notas,
            Service::Notif => ServiceKind::Notif,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let kind = ServiceKind::from(cli.service);

    let mut settings = match cli.config.as_deref() {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("loading settings")?;
    if let Some(port) = cli.port {
        settings.port = port;
    }

    init_tracing(&settings)?;
    if settings.uses_insecure_secret() {
        tracing::warn!("jwt_secret is the built-in development secret, set JWT_SECRET in production");
    }

    // Bind before touching any store so health probes get an answer.
    let addr = settings.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(service = kind.name(), %addr, "listening");

    let app = portal_backend::build(kind, Arc::new(settings))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(service = kind.name(), "stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown requested");
}
