//! Platform statistics server
//!
//! Usage:
//!   REDIS_URL=redis://localhost:6379/0 cargo run --release
//!
//! Listens on `PORT` (default 8012) and answers statistics commands with
//! JSON lines. See `naebak_stats::config` for every setting.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use naebak_stats::stats::{AggregationEngine, Bootstrap, ResetPolicy, StatsCommandExecutor};
use naebak_stats::{store, LogFormat, ReferenceCatalog, ServiceConfig};

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env();
    init_logging(config.log_format);
    config.validate()?;

    let catalog = match &config.catalog_path {
        Some(path) => ReferenceCatalog::from_path(path)?,
        None => ReferenceCatalog::builtin()?,
    };
    info!(
        regions = catalog.regions().len(),
        organizations = catalog.organizations().len(),
        "Loaded reference catalog"
    );

    let store = store::connect(&config.store).await?;
    let engine = AggregationEngine::new(store.clone(), Arc::new(catalog));
    let bootstrap = Bootstrap::new(store, ResetPolicy::from_flag(config.allow_reset));

    if config.seed_on_startup {
        bootstrap.seed_defaults().await?;
    }
    if config.allow_reset {
        warn!("Statistics reset is enabled");
    }
    info!(
        retention_days = config.retention_days,
        real_time = config.real_time_enabled,
        aggregation_interval = config.aggregation_interval,
        "Statistics settings"
    );

    let executor = StatsCommandExecutor::new(engine, bootstrap, config.default_top_limit)
        .with_config_report(config.report());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    naebak_stats::server::run_server(listener, Arc::new(executor)).await?;

    Ok(())
}
