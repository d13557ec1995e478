//! Command line and environment configuration.
//!
//! [`Cli`] is what the user typed; [`Config`] is the validated form the rest of
//! the crate works with.
use std::time::Duration;

use clap::Parser;

use crate::container::{self, ExclusionRule, ImageFilter};
use crate::docker::ClientOptions;
use crate::error::ErrorKind;
use crate::fsutil::SocketPathError;
use crate::metrics::DEFAULT_WORKERS;
use crate::transport::{DEFAULT_SOCKET_PATH, Endpoint, ExchangeOptions, ParseEndpointError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no image filter given: pass --application <SUBSTRING> or --all-images")]
    MissingFilter,
    #[error("invalid image filter: {0}")]
    Filter(#[source] container::Error),
    #[error("invalid exclusion rule: {0}")]
    Exclusion(#[source] container::Error),
    #[error("worker pool size must be at least 1")]
    ZeroWorkers,
    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,
    #[error(transparent)]
    Endpoint(#[from] ParseEndpointError),
    #[error(transparent)]
    SocketPath(#[from] SocketPathError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Collects resource usage snapshots for the containers of one application.
#[derive(Parser, Debug, Clone)]
#[command(name = "docker-metrics", version)]
pub struct Cli {
    /// Substring of the image name that selects containers (case-sensitive)
    #[arg(short, long, env = "DOCKER_METRICS_APPLICATION")]
    pub application: Option<String>,

    /// Select every container regardless of image
    #[arg(long, conflicts_with = "application")]
    pub all_images: bool,

    /// Runtime API endpoint: unix:///path, tcp://host:port or a socket path
    #[arg(long, env = "DOCKER_HOST", default_value_t = format!("unix://{DEFAULT_SOCKET_PATH}"))]
    pub endpoint: String,

    /// Number of stats requests in flight at once
    #[arg(short, long, env = "DOCKER_METRICS_WORKERS", default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request deadline in seconds, covering connect, write and read
    #[arg(short, long, env = "DOCKER_METRICS_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Skip containers whose name matches: exact:<name>, substring:<text> or regex:<pattern>
    ///
    /// Text without a prefix is matched exactly. May be repeated.
    #[arg(short = 'x', long = "exclude", env = "DOCKER_METRICS_EXCLUDE")]
    pub exclusions: Vec<String>,

    /// Value of a Host header to send with every request
    #[arg(long, env = "DOCKER_METRICS_HOST_HEADER")]
    pub host_header: Option<String>,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Endpoint,
    pub filter: ImageFilter,
    pub workers: usize,
    pub exclusions: Vec<ExclusionRule>,
    pub request_timeout: Duration,
    pub host_header: Option<String>,
}

impl Config {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            exchange: ExchangeOptions {
                timeout: self.request_timeout,
                ..Default::default()
            },
            host_header: self.host_header.clone(),
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let filter = match (cli.application, cli.all_images) {
            (_, true) => ImageFilter::Any,
            (Some(application), false) => {
                ImageFilter::substring(application).map_err(Error::Filter)?
            }
            (None, false) => return Err(Error::MissingFilter),
        };

        if cli.workers == 0 {
            return Err(Error::ZeroWorkers);
        }
        if cli.timeout == 0 {
            return Err(Error::ZeroTimeout);
        }

        let exclusions = cli
            .exclusions
            .iter()
            .map(|rule| rule.parse::<ExclusionRule>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::Exclusion)?;

        Ok(Self {
            endpoint: cli.endpoint.parse()?,
            filter,
            workers: cli.workers,
            exclusions,
            request_timeout: Duration::from_secs(cli.timeout),
            host_header: cli.host_header.filter(|host| !host.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let args = std::iter::once("docker-metrics").chain(args.iter().copied());
        let cli = Cli::try_parse_from(args).expect("arguments should parse");
        Config::try_from(cli)
    }

    #[test]
    fn test_config_from_arguments() {
        let config = parse(&[
            "--application",
            "nova",
            "--endpoint",
            "unix:///run/docker.sock",
            "--workers",
            "4",
            "--timeout",
            "5",
            "--exclude",
            "['/nova_ssh']",
            "--exclude",
            "regex:nova_libvirt'\\]$",
            "--host-header",
            "docker",
        ])
        .unwrap();

        let filter = ImageFilter::Substring("nova".to_owned());
        assert_eq!(config.filter, filter);
        assert_eq!(config.endpoint, Endpoint::unix("/run/docker.sock"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.exclusions.len(), 2);
        assert!(config.exclusions[0].matches("['/nova_ssh']"));
        assert!(config.exclusions[1].matches("['/nova_libvirt']"));
        assert!(!config.exclusions[1].matches("['/nova_libvirt_old']"));

        let options = config.client_options();
        assert_eq!(options.exchange.timeout, Duration::from_secs(5));
        assert_eq!(options.host_header.as_deref(), Some("docker"));
    }

    #[test]
    fn test_all_images() {
        let config = parse(&["--all-images", "--endpoint", "tcp://127.0.0.1:2375"]).unwrap();
        assert_eq!(config.filter, ImageFilter::Any);
        assert_eq!(config.endpoint, Endpoint::tcp("127.0.0.1:2375"));
    }

    #[test]
    fn test_all_images_conflicts_with_application() {
        let args = ["docker-metrics", "--all-images", "--application", "nova"];
        let result = Cli::try_parse_from(args);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_application_is_rejected() {
        match parse(&["--application", ""]).unwrap_err() {
            Error::Filter(container::Error::EmptyFilter) => {}
            other => panic!("Expected EmptyFilter, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let err = parse(&["--application", "nova", "--workers", "0"]).unwrap_err();
        assert!(matches!(err, Error::ZeroWorkers));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = parse(&["--application", "nova", "--timeout", "0"]).unwrap_err();
        assert!(matches!(err, Error::ZeroTimeout));
    }

    #[test]
    fn test_bad_exclusion_pattern_is_rejected() {
        match parse(&["--application", "nova", "--exclude", "regex:(["]).unwrap_err() {
            Error::Exclusion(container::Error::InvalidExclusionPattern { rule, .. }) => {
                assert_eq!(rule, "regex:([")
            }
            other => panic!("Expected InvalidExclusionPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_endpoint_is_rejected() {
        let err = parse(&["--application", "nova", "--endpoint", "http://localhost"]).unwrap_err();
        assert!(matches!(err, Error::Endpoint(_)));
    }

    #[test]
    fn test_empty_host_header_is_ignored() {
        let config = parse(&["--application", "nova", "--host-header", ""]).unwrap();
        assert_eq!(config.host_header, None);
    }
}
