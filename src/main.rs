use std::sync::Arc;

use actix_web::dev::Service;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod http;
mod metrics;
mod services;
mod store;
mod utils;

use config::{Config, Storage};
use services::Services;
use store::{
    InMemoryCartRepository, InMemoryCatalogRepository, InMemoryOrderRepository,
    ScyllaCartRepository, ScyllaCatalogRepository, ScyllaOrderRepository,
};
use utils::retry_with_backoff;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=storefront=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug")),
        )
        .init();

    let config = Config::load().unwrap_or_else(|e| e.exit());
    tracing::info!(storage = ?config.storage, "Starting storefront");

    // === 1. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        families = metrics.registry().gather().len(),
        "Metrics registry created"
    );

    // === 2. Repositories ===
    let services = match config.storage {
        Storage::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on exit");
            Services::new(
                Arc::new(InMemoryCatalogRepository::new()),
                Arc::new(InMemoryOrderRepository::new()),
                Arc::new(InMemoryCartRepository::new()),
                metrics.clone(),
            )
        }
        Storage::Scylla => {
            let session = retry_with_backoff(config.connect_retry(), |attempt| {
                tracing::info!(attempt = attempt, nodes = ?config.scylla_nodes, "Connecting to ScyllaDB");
                store::connect(&config.scylla_nodes)
            })
            .await
            .into_result()?;

            store::init_schema(
                &session,
                &config.scylla_keyspace,
                config.scylla_replication_factor,
            )
            .await?;

            let session = Arc::new(session);
            Services::new(
                Arc::new(ScyllaCatalogRepository::new(session.clone())),
                Arc::new(ScyllaOrderRepository::new(session.clone())),
                Arc::new(ScyllaCartRepository::new(session)),
                metrics.clone(),
            )
        }
    };

    // === 3. HTTP server ===
    let services = web::Data::new(services);
    let pagination = web::Data::new(config.pagination());
    let metrics_data = web::Data::from(metrics.clone());
    let addr = config.socket_addr();
    tracing::info!(addr = %addr, "Starting HTTP server");

    HttpServer::new(move || {
        let metrics = metrics.clone();
        App::new()
            .app_data(services.clone())
            .app_data(pagination.clone())
            .app_data(metrics_data.clone())
            .wrap_fn(move |req, srv| {
                let metrics = metrics.clone();
                let method = req.method().clone();
                let fut = srv.call(req);
                async move {
                    let res = fut.await?;
                    let route = res
                        .request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string());
                    let status = res.status().as_u16();
                    metrics.record_request(&route, status);
                    tracing::debug!(method = %method, route = %route, status = status, "Request handled");
                    Ok(res)
                }
            })
            .configure(http::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
