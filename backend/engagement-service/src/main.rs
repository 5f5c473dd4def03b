use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engagement_service::config::{Config, StoreBackend};
use engagement_service::handlers::{self, AppState};
use engagement_service::repository::{EntityStore, MemoryEntityStore, PgEntityStore};

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,engagement_service=debug".into()),
        )
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

async fn build_store(config: &Config) -> Result<Arc<dyn EntityStore>> {
    match config.store {
        StoreBackend::Memory => {
            info!("Using in-memory entity store");
            Ok(Arc::new(MemoryEntityStore::new()))
        }
        StoreBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres store")?;

            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .min_connections(database.min_connections)
                .acquire_timeout(Duration::from_secs(database.acquire_timeout_secs))
                .idle_timeout(Duration::from_secs(600))
                .connect(&database.url)
                .await
                .context("Failed to connect to database")?;
            info!("Database pool created");

            let store = PgEntityStore::new(pool);
            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            info!("Database migrations completed");

            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        port = config.app.http_port,
        store = ?config.store,
        "Starting engagement-service"
    );

    let store = build_store(&config).await?;
    let state = web::Data::new(AppState::new(store, config.engagement.clone()));

    let bind_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("HTTP server listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("engagement-service shut down");
    Ok(())
}
