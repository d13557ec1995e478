use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{RequestBatch, StatsRequest};
use crate::container::ContainerID;
use crate::docker::{self, Client, StatsSnapshot};
use crate::error::ErrorKind;
use crate::transport::{self, Connect};

/// Default number of concurrent stats requests.
pub const DEFAULT_WORKERS: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Docker(#[from] docker::Error),
    #[error("request task panicked: {0}")]
    Panicked(String),
    #[error("request task aborted before reporting a result")]
    Aborted,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Docker(err) => err.kind(),
            FetchError::Panicked(_) => ErrorKind::Internal,
            FetchError::Aborted => ErrorKind::Cancelled,
        }
    }
}

impl From<JoinError> for FetchError {
    fn from(err: JoinError) -> Self {
        match err.try_into_panic() {
            Ok(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|message| (*message).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_owned());
                FetchError::Panicked(message)
            }
            Err(_) => FetchError::Aborted,
        }
    }
}

/// A stats request that did not produce a snapshot.
#[derive(Debug)]
pub struct FetchFailure {
    pub label: String,
    pub id: ContainerID,
    pub error: FetchError,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.label, self.id, self.error)
    }
}

/// Outcome of one collection round.
///
/// Snapshots and failures are both in batch order.
#[derive(Debug)]
pub struct BatchReport {
    elapsed: Duration,
    snapshots: Vec<StatsSnapshot>,
    failures: Vec<FetchFailure>,
}

impl BatchReport {
    /// Wall-clock time from the first dispatch to the last completion.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn snapshots(&self) -> &[StatsSnapshot] {
        &self.snapshots
    }

    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    pub fn requested(&self) -> usize {
        self.snapshots.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns all snapshots, or the first failure in batch order.
    pub fn into_result(self) -> Result<Vec<StatsSnapshot>, FetchFailure> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(self.snapshots),
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "request batch took {:.3} sec", self.elapsed.as_secs_f64())?;
        write!(
            f,
            "{} requested, {} succeeded, {} failed",
            self.requested(),
            self.snapshots.len(),
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

/// Fetches a stats snapshot for every request in `batch`, running at most
/// `workers` requests at a time.
///
/// Every request uses its own connection. A failing request never stops the
/// others; all outcomes are gathered into the returned [`BatchReport`] once
/// the whole batch has finished. Cancelling `cancel` aborts the requests in
/// flight and keeps queued ones from starting.
///
/// # Arguments
///
/// * `client` - Shared client used for every request.
/// * `batch` - Requests to dispatch.
/// * `workers` - Pool size. Values below one are treated as one.
/// * `cancel` - Token that cuts the round short.
pub async fn collect_metrics<C: Connect>(
    client: Arc<Client<C>>,
    batch: RequestBatch,
    workers: usize,
    cancel: &CancellationToken,
) -> BatchReport {
    let started = Instant::now();
    let total = batch.len();
    let permits = Arc::new(Semaphore::new(workers.max(1)));

    let mut identities = Vec::with_capacity(total);
    let mut indices = HashMap::with_capacity(total);
    let mut tasks = JoinSet::new();
    for (index, request) in batch.into_iter().enumerate() {
        identities.push((request.label().to_owned(), request.id().clone()));

        let client = Arc::clone(&client);
        let permits = Arc::clone(&permits);
        let cancel = cancel.clone();
        let handle = tasks.spawn(async move {
            let outcome = fetch(&client, &request, &permits, &cancel).await;
            (index, outcome)
        });
        indices.insert(handle.id(), index);
    }

    let mut outcomes: Vec<Option<Result<StatsSnapshot, FetchError>>> =
        (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(err) => {
                log::error!("Stats request task failed: {}", err);
                if let Some(&index) = indices.get(&err.id()) {
                    outcomes[index] = Some(Err(err.into()));
                }
            }
        }
    }
    let elapsed = started.elapsed();

    let mut snapshots = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for ((label, id), outcome) in identities.into_iter().zip(outcomes) {
        match outcome.unwrap_or(Err(FetchError::Aborted)) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(error) => {
                log::warn!("Failed to fetch stats for {} ({}): {}", label, id, error);
                failures.push(FetchFailure { label, id, error });
            }
        }
    }
    log::debug!(
        "Collected {} of {} snapshots in {:?}",
        snapshots.len(),
        total,
        elapsed
    );

    BatchReport {
        elapsed,
        snapshots,
        failures,
    }
}

async fn fetch<C: Connect>(
    client: &Client<C>,
    request: &StatsRequest,
    permits: &Semaphore,
    cancel: &CancellationToken,
) -> Result<StatsSnapshot, FetchError> {
    let _permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(docker::Error::from(transport::Error::Cancelled).into());
        }
        permit = permits.acquire() => permit.map_err(|_| FetchError::Aborted)?,
    };

    log::info!("fetching from {}", request.label());
    let snapshot = client
        .stats_snapshot(request.label(), request.id(), request.path(), cancel)
        .await?;

    Ok(snapshot)
}
