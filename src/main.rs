//! Subs Tracker Server
//!
//! Tracks users' recurring subscriptions and answers "how much does this
//! cost over a period" queries.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};
use anyhow::Context;
use subs_core::config::{LogFormat, StorageBackend};
use subs_core::traits::SubscriptionRepository;
use subs_core::AppConfig;
use subs_db::{create_pool, run_migrations, MemorySubscriptionRepository, PgSubscriptionRepository};
use subs_services::{DynSubscriptionService, SubscriptionService};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing(config: &AppConfig) {
    let level = &config.logging.level;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "subs_tracker={},subs_api={},subs_services={},subs_db={},actix_web=info,sqlx=warn",
            level, level, level, level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

/// Build the repository selected by `storage.backend`
async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn SubscriptionRepository>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("Failed to create database pool")?;

            if config.database.run_migrations {
                run_migrations(&pool)
                    .await
                    .context("Failed to apply database migrations")?;
            }

            Ok(Arc::new(PgSubscriptionRepository::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(MemorySubscriptionRepository::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // An explicit file replaces the config/ directory lookup
    let config = match std::env::var("SUBS_CONFIG") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&config);

    info!("Starting Subs Tracker v{}", env!("CARGO_PKG_VERSION"));

    let repo = build_repository(&config).await?;
    let service: web::Data<DynSubscriptionService> = web::Data::new(
        SubscriptionService::new(repo)
            .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs))
            .with_max_limit(config.pagination.max_limit),
    );

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::LOCATION])
            .max_age(3600);

        App::new()
            .app_data(service.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(subs_api::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    info!("Server stopped");
    Ok(())
}
