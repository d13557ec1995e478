//! Client for the container runtime management API.
//!
//! Each call opens a fresh connection, sends one request and parses the
//! response. Calls are independent; a [`Client`] can be shared between tasks
//! behind an `Arc`.
mod error;
mod models;

use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::container::{ContainerDescriptor, ContainerID, ImageFilter};
use crate::http::{self, HttpCompletion};
use crate::transport::{self, Connect, Endpoint, ExchangeOptions};

pub use error::{Error, Result};
pub use models::{ContainerSummary, StatsSnapshot, render_names};

/// Path of the container listing.
pub const CONTAINERS_PATH: &str = "/containers/json";

/// Path of a single, non-streaming stats snapshot for `id`.
pub fn stats_path(id: &ContainerID) -> String {
    format!("/containers/{id}/stats?stream=false")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub exchange: ExchangeOptions,
    /// Sent as a `Host` header when set; requests are header-less otherwise.
    pub host_header: Option<String>,
}

#[derive(Debug)]
pub struct Client<C = Endpoint> {
    connector: C,
    options: ClientOptions,
}

impl<C: Connect> Client<C> {
    pub fn new(connector: C, options: ClientOptions) -> Self {
        Self { connector, options }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    fn request(&self, path: &str) -> Vec<u8> {
        match &self.options.host_header {
            Some(host) => http::build_request_with_host("GET", path, host),
            None => http::build_request("GET", path),
        }
    }

    /// Issues `GET path` on a fresh connection and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if connecting, sending or receiving fails.
    /// - [`Error::Http`] if the response cannot be framed or has a non-2xx status.
    pub async fn get(&self, path: &str, cancel: &CancellationToken) -> Result<String> {
        let options = &self.options.exchange;
        let deadline = Instant::now() + options.timeout;

        let raw = {
            let mut stream =
                transport::connect_until(&self.connector, deadline, options, cancel).await?;
            transport::send_and_receive_until(
                &mut stream,
                &self.request(path),
                options,
                deadline,
                cancel,
                &HttpCompletion,
            )
            .await?
        };
        log::trace!("GET {} returned {} bytes", path, raw.len());

        http::decode_body(&raw).map_err(|source| Error::Http {
            path: path.to_owned(),
            source,
        })
    }

    /// Issues `GET path` and parses the body as JSON.
    pub async fn get_json(&self, path: &str, cancel: &CancellationToken) -> Result<Value> {
        let body = self.get(path, cancel).await?;
        serde_json::from_str(&body).map_err(|source| Error::Json {
            path: path.to_owned(),
            source,
        })
    }

    /// Lists containers whose image matches `filter`, in the order the runtime returned them.
    ///
    /// # Errors
    ///
    /// Any failure of the single listing request, [`Error::Json`] if the body is
    /// not a JSON array of containers, and [`Error::Container`] if a matching
    /// entry carries an unusable id.
    pub async fn list_containers(
        &self,
        filter: &ImageFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContainerDescriptor>> {
        let body = self.get(CONTAINERS_PATH, cancel).await?;
        let summaries: Vec<ContainerSummary> =
            serde_json::from_str(&body).map_err(|source| Error::Json {
                path: CONTAINERS_PATH.to_owned(),
                source,
            })?;
        log::debug!("Runtime reported {} containers", summaries.len());

        let containers = summaries
            .into_iter()
            .filter(|summary| filter.matches(&summary.image))
            .map(ContainerSummary::into_descriptor)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("{} containers match {}", containers.len(), filter);

        Ok(containers)
    }

    /// Fetches one stats snapshot for `container`.
    pub async fn container_stats(
        &self,
        container: &ContainerDescriptor,
        cancel: &CancellationToken,
    ) -> Result<StatsSnapshot> {
        let path = stats_path(container.id());
        self.stats_snapshot(container.label(), container.id(), &path, cancel)
            .await
    }

    /// Fetches the stats document at `path` and tags it with `label` and `id`.
    pub(crate) async fn stats_snapshot(
        &self,
        label: &str,
        id: &ContainerID,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<StatsSnapshot> {
        let body = self.get_json(path, cancel).await?;
        Ok(StatsSnapshot::new(label, id.clone(), body))
    }
}
