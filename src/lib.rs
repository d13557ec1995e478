use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use config::Config;
use docker::Client;
use error::Error;
use metrics::BatchReport;
use transport::{Connect, Endpoint};

/// Docker Metrics: collects resource-usage snapshots for the containers of one
/// application from a container runtime's management API.
///
/// The runtime is reached over a Unix domain socket (or TCP) with a minimal
/// HTTP/1.1 exchange per request. Containers are selected by image substring,
/// and their stats are fetched concurrently through a fixed-size pool.
pub mod config;
pub mod container;
pub mod docker;
pub mod error;
pub mod fsutil;
pub mod http;
pub mod metrics;
pub mod transport;

/// Runs one collection round against the configured endpoint.
///
/// # Returns
///
/// The [`BatchReport`] of the fan-out. Failures of individual stats requests
/// are recorded in the report and do not fail the run.
///
/// # Errors
///
/// - [`Error::Config`] if the endpoint is a Unix socket path that does not
///   exist or is not a socket.
/// - [`Error::Enumeration`] if the container listing fails.
pub async fn run(config: &Config, cancel: &CancellationToken) -> Result<BatchReport, Error> {
    if let Endpoint::Unix(path) = &config.endpoint {
        fsutil::ensure_socket(path).map_err(config::Error::from)?;
    }

    let client = Arc::new(Client::new(config.endpoint.clone(), config.client_options()));
    run_with(client, config, cancel).await
}

/// Same as [`run`], through an already constructed client.
///
/// `config.endpoint` is ignored; the client's connector is used instead.
pub async fn run_with<C: Connect>(
    client: Arc<Client<C>>,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<BatchReport, Error> {
    log::debug!(
        "Listing containers at {} matching {}",
        client.connector(),
        config.filter
    );
    let containers = client
        .list_containers(&config.filter, cancel)
        .await
        .map_err(|source| Error::Enumeration {
            endpoint: client.connector().to_string(),
            source,
        })?;

    let batch = metrics::build_batch(&containers, &config.exclusions);
    log::debug!(
        "Dispatching {} stats requests over {} workers",
        batch.len(),
        config.workers
    );

    Ok(metrics::collect_metrics(client, batch, config.workers, cancel).await)
}
