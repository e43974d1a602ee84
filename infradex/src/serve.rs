//! `serve`: catalog API (plus the write endpoint when configured) and the
//! admin listener.

use crate::config::Config;
use crate::errors::CliError;
use crate::rpc::submission_service;
use aggregator::Aggregator;
use aggregator::fetcher::HttpFetcher;
use aggregator::networks::Networks;
use shared::admin_service::{AdminService, Readiness};
use shared::http::run_http_service;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub async fn run(config: Config) -> Result<(), CliError> {
    let settings = &config.aggregator;
    let networks = Networks::new(settings.networks.clone());

    let fetcher = HttpFetcher::new(
        networks.clone(),
        settings.fetch_timeout_secs.map(Duration::from_secs),
    )?;
    let aggregator = Aggregator::new(networks.clone(), Arc::new(fetcher));
    let mut app = aggregator::api::router(aggregator);

    match &config.submission {
        Some(submission_config) => {
            let service = submission_service(networks.clone(), submission_config)?;
            app = app.merge(submission::api::router(service));
        }
        None => tracing::info!("No submission config, write endpoint disabled"),
    }

    let readiness = Readiness::new();
    let admin = AdminService::new(readiness.clone());

    let listener = TcpListener::bind((settings.listener.host.as_str(), settings.listener.port)).await?;
    tracing::info!(
        host = %settings.listener.host,
        port = settings.listener.port,
        networks = networks.len(),
        "Catalog API listening"
    );
    readiness.mark_ready();

    tokio::try_join!(
        async { axum::serve(listener, app).await.map_err(CliError::from) },
        async {
            run_http_service(
                &settings.admin_listener.host,
                settings.admin_listener.port,
                admin,
            )
            .await
            .map_err(CliError::from)
        },
    )?;

    Ok(())
}
