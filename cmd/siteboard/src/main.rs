//! # SiteBoard Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::metrics::Metrics;
use api_adapters::{router, AppState};
use auth_adapters::JwtAuthProvider;
use configs::{LogFormat, LoggingSettings, Settings};
use domains::{SiteRepository, UserRepository};
use secrecy::ExposeSecret;
use services::SiteService;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.logging);

    // 1. Storage
    let (sites, users) = build_repositories(&settings).await?;

    // 2. Auth
    let auth = JwtAuthProvider::new(settings.auth.jwt_secret.expose_secret().as_bytes());

    // 3. Wrap in AppState (dynamic dispatch over the ports)
    let state = AppState {
        sites: SiteService::new(sites, users),
        auth: Arc::new(auth),
        metrics: Arc::new(Metrics::new()),
        expose_error_detail: !settings.is_production(),
    };

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, environment = ?settings.app.environment, "SiteBoard listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("SiteBoard stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured filter when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[cfg(feature = "db-postgres")]
async fn build_repositories(
    settings: &Settings,
) -> anyhow::Result<(Arc<dyn SiteRepository>, Arc<dyn UserRepository>)> {
    use storage_adapters::postgres::{self, PgSiteRepository, PgUserRepository};

    let db = &settings.database;
    let pool = postgres::connect(
        db.url.expose_secret(),
        db.max_connections,
        db.acquire_timeout(),
    )
    .await
    .context("connecting to Postgres")?;
    postgres::migrate(&pool).await.context("running migrations")?;
    info!(max_connections = db.max_connections, "Postgres ready");

    Ok((
        Arc::new(PgSiteRepository::new(pool.clone())),
        Arc::new(PgUserRepository::new(pool)),
    ))
}

#[cfg(not(feature = "db-postgres"))]
async fn build_repositories(
    _settings: &Settings,
) -> anyhow::Result<(Arc<dyn SiteRepository>, Arc<dyn UserRepository>)> {
    use storage_adapters::{InMemorySiteRepository, InMemoryUserRepository};

    tracing::warn!("built without db-postgres; data lives in memory only");
    Ok((
        Arc::new(InMemorySiteRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown requested");
}
