pub mod domain;
pub mod identity;
pub mod infra;
pub mod store;
pub mod subsystems;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::extract::FromRef;
use backon::{ExponentialBuilder, Retryable};
use identity::{Identity, LocalIdentityProvider};
use infra::{DatabaseSettings, RateLimiter, Settings, StoreBackend};
use sqlx::{PgPool, postgres::PgPoolOptions};
use store::{MemoryStore, PgDocumentStore, Store};
use subsystems::{RateLimitSweeper, WebServer};
use tokio::net::TcpListener;
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemBuilder, Toplevel};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Settings,
    pub store: Store,
    pub identity: Identity,
    pub rate_limiter: RateLimiter,
}

pub fn build_subsystems(state: AppState, listener: TcpListener) -> Toplevel {
    let sweeper = state.rate_limiter.is_enabled().then(|| {
        RateLimitSweeper::new(
            state.rate_limiter.clone(),
            Duration::from_secs(state.settings.rate_limit.sweep_interval_seconds),
        )
    });
    let webserver = WebServer::new(state, listener);

    // Setup and execute subsystem tree
    Toplevel::new(async |s| {
        if let Some(sweeper) = sweeper {
            s.start(SubsystemBuilder::new(
                "RateLimitSweeper",
                sweeper.into_subsystem(),
            ));
        }
        s.start(SubsystemBuilder::new(
            "Webserver",
            webserver.into_subsystem(),
        ));
    })
}

/// Runs the subsystems without installing signal handlers, for tests.
pub async fn test_server(toplevel: Toplevel) -> anyhow::Result<()> {
    toplevel
        .handle_shutdown_requests(Duration::from_millis(2000))
        .await
        .map_err(Into::into)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let listener = subsystems::bind_listener(&state.settings).await?;
    build_subsystems(state, listener)
        .catch_signals()
        .handle_shutdown_requests(Duration::from_millis(2000))
        .await
        .map_err(Into::into)
}

pub fn configure_tracing(settings: &Settings) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(
        settings.application.logs_directory.clone(),
        "shop_server.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .init();
    _guard
}

pub async fn construct_app_state(settings: Settings) -> Result<AppState, anyhow::Error> {
    let store: Store = match settings.store.backend {
        StoreBackend::Postgres => {
            let pool = construct_db_pool(&settings.database).await?;
            let store = PgDocumentStore::new(pool);
            store
                .migrate()
                .await
                .context("Failed to migrate the document store.")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Using the in-memory document store. Data is lost on shutdown.");
            Arc::new(MemoryStore::new())
        }
    };
    let identity: Identity = Arc::new(LocalIdentityProvider::new(
        &store,
        settings.auth.token_ttl_seconds,
    ));
    let rate_limiter = RateLimiter::new(&settings.rate_limit);

    Ok(AppState {
        settings,
        store,
        identity,
        rate_limiter,
    })
}

pub async fn construct_db_pool(settings: &DatabaseSettings) -> Result<PgPool, anyhow::Error> {
    let connect = || {
        PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_with(settings.with_db_name())
    };
    connect
        .retry(ExponentialBuilder::default())
        .sleep(tokio::time::sleep)
        .notify(|err, dur| error!("Connecting to Postgres failed with {err}, retrying after {dur:?}"))
        .await
        .context("Failed to connect to Postgres database.\n1. Check database is running.\n2. Check Postgres database settings in configuration file(s).")
}
