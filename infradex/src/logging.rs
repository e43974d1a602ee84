//! Logging, error reporting and metrics setup.

use crate::config::{LoggingConfig, MetricsConfig};
use crate::errors::CliError;
use metrics_exporter_statsd::StatsdBuilder;
use shared::metrics_defs::describe_all;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const METRICS_PREFIX: &str = "infradex";

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays clean. The returned guard flushes Sentry on drop.
pub fn init(config: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let level = config.map_or("info", |c| c.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let guard = config.and_then(|c| c.sentry_dsn.as_deref()).map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });
    let sentry_layer = guard
        .as_ref()
        .map(|_| sentry::integrations::tracing::layer());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_layer)
        .init();

    guard
}

/// Installs the statsd recorder when configured and registers every metric
/// description.
pub fn init_metrics(config: Option<&MetricsConfig>) -> Result<(), CliError> {
    let Some(config) = config else {
        return Ok(());
    };

    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(METRICS_PREFIX))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder)
        .map_err(|_| CliError::Metrics("a recorder is already installed".to_string()))?;

    describe_all(aggregator::metrics_defs::ALL_METRICS);
    describe_all(submission::metrics_defs::ALL_METRICS);
    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );

    Ok(())
}
