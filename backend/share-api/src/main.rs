use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use share_api::config::{Config, StoreBackend};
use share_api::db::{MemoryStore, PgStore, SharedStore};
use share_api::middleware::SessionMiddleware;
use share_api::routes::configure_routes;
use share_api::schema::{build_schema, AuthSettings};

async fn open_store(config: &Config) -> anyhow::Result<SharedStore> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let db_config = config
                .store
                .database
                .clone()
                .context("Database configuration missing for postgres backend")?;
            db_config.log_config();

            let pool = db_pool::create_pool(db_config)
                .await
                .context("Failed to connect to database")?;

            let store = PgStore::new(pool);
            store.migrate().await.context("Failed to run migrations")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // JSON logs with span context for log aggregation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,share_api=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    info!("Starting Share API...");

    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        backend = ?config.store.backend,
        token_ttl_seconds = config.jwt.expiry_seconds,
        "Configuration loaded"
    );

    let store = open_store(&config).await?;
    let schema = build_schema(store, AuthSettings::from(&config.jwt), &config.graphql);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Share API listening on http://{}/graphql", bind_addr);

    let secret: Arc<str> = config.jwt.secret.clone().into();
    let playground = config.graphql.playground;

    HttpServer::new(move || {
        App::new()
            .wrap(SessionMiddleware::new(secret.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(web::Data::new(schema.clone()))
            .configure(configure_routes(playground))
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {bind_addr}"))?
    .run()
    .await
    .context("HTTP server failed")?;

    Ok(())
}
