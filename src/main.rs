//! Grow Fitness server entry point.
//!
//! Loads configuration, picks the storage backend and mailer, starts the
//! cron job runner and serves the HTTP API until Ctrl+C.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use grow_fitness::adapters::auth::JwtSessionValidator;
use grow_fitness::adapters::email::{LoggingMailer, ResendConfig, ResendMailer};
use grow_fitness::adapters::http::{api_router, with_http_layers};
use grow_fitness::adapters::memory::InMemoryStore;
use grow_fitness::bootstrap::{build_app, job_runner, Repositories};
use grow_fitness::config::{AppConfig, DatabaseConfig, EmailConfig};
use grow_fitness::ports::Mailer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        "Starting Grow Fitness backend"
    );

    let repos = connect_repositories(&config.database).await?;
    let mailer = build_mailer(&config.email)?;
    let offset = config.scheduler.offset()?;
    let app = build_app(&repos, mailer, offset);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if config.scheduler.enabled {
        let runner = job_runner(&app.jobs, &config.scheduler)?;
        Some(tokio::spawn(async move { runner.run(shutdown_rx).await }))
    } else {
        tracing::info!("Scheduler disabled; jobs run only on demand");
        None
    };

    let validator = Arc::new(JwtSessionValidator::new(&config.auth.jwt_secret));
    let router = with_http_layers(api_router(app.handlers, validator), &config.server);

    let address = config.server.socket_addr()?;
    let listener = TcpListener::bind(address).await?;
    tracing::info!(%address, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Scheduler task failed");
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

async fn connect_repositories(config: &DatabaseConfig) -> Result<Repositories, Box<dyn Error>> {
    if config.is_in_memory() {
        tracing::warn!("Using in-memory storage; data is lost on restart");
        return Ok(Repositories::in_memory(Arc::new(InMemoryStore::new())));
    }

    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .connect(&config.url)
        .await?;
    tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Repositories::postgres(pool))
}

fn build_mailer(config: &EmailConfig) -> Result<Arc<dyn Mailer>, Box<dyn Error>> {
    match &config.resend_api_key {
        Some(key) => {
            let resend = ResendConfig::new(key.clone(), config.from_header())
                .with_base_url(config.api_base_url.clone());
            tracing::info!(from = %config.from_header(), "Sending email through Resend");
            Ok(Arc::new(ResendMailer::new(resend)?))
        }
        None => {
            tracing::warn!("No Resend API key configured; emails are logged, not sent");
            Ok(Arc::new(LoggingMailer::new()))
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}
