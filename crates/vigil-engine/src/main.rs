//! vigil daemon binary.
//!
//! Wires the synchronization engine to its real collaborators: the
//! `PostgreSQL` store and the camera NVR HTTP API. Loads configuration,
//! initializes all subsystems, and enters the scheduler loop, which runs
//! until the process is externally terminated.
//!
//! # Startup Sequence
//!
//! 1. Load and validate configuration from `vigil-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run the idempotent migrations
//! 4. Construct the upstream HTTP client
//! 5. Enter the scheduler loop
//!
//! Every startup failure is fatal: without valid configuration, a
//! reachable database, and a provisioned schema the process cannot do
//! useful work. Once the loop is entered, no error terminates the
//! process; failures are logged and retried with backoff.

mod store;
mod upstream;

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;
use vigil_core::config::VigilConfig;
use vigil_core::{scheduler, sync};
use vigil_db::{PostgresConfig, PostgresPool};
use vigil_upstream::UpstreamClient;

use crate::store::PgEventStore;
use crate::upstream::HttpEventSource;

/// Application entry point for the vigil daemon.
///
/// # Errors
///
/// Returns an error if any startup step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and validate configuration.
    let path = config_path();
    let config = VigilConfig::from_file(&path)?;
    config.validate()?;

    // 2. Initialize structured logging. RUST_LOG wins over the
    //    configured fallback filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_target(true)
        .init();

    info!(
        config = %path.display(),
        cameras = config.cameras.len(),
        poll_interval_secs = config.scheduler.poll_interval_secs,
        "vigil-engine starting"
    );

    // 3. Connect to PostgreSQL and provision the schema.
    let pg_config = PostgresConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections);
    let pool = PostgresPool::connect(&pg_config).await?;
    pool.run_migrations().await?;

    // 4. Construct the upstream client.
    let client = UpstreamClient::new(&config.upstream.base_url)?;
    info!(base_url = %config.upstream.base_url, "Upstream client ready");

    // 5. Enter the scheduler loop.
    let store = PgEventStore::new(pool);
    let source = HttpEventSource::new(client);
    let cameras = config.cameras;

    info!("Entering synchronization loop");
    scheduler::run(config.scheduler.poll_interval(), || {
        sync::run_pass(&store, &source, &cameras)
    })
    .await;

    Ok(())
}

/// Resolve the configuration file path: `VIGIL_CONFIG` if set, else
/// `vigil-config.yaml` in the working directory.
fn config_path() -> PathBuf {
    std::env::var("VIGIL_CONFIG")
        .map_or_else(|_| PathBuf::from("vigil-config.yaml"), PathBuf::from)
}
