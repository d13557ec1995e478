use std::process::ExitCode;

use clap::Parser;
use docker_metrics::config::{Cli, Config};
use docker_metrics::error::ResultOkLogExt;
use tokio_util::sync::CancellationToken;

/// Entry point for the Docker Metrics collector.
///
/// Lists the containers whose image matches the requested application, fetches
/// one stats snapshot per container and prints how long the batch took.
///
/// Exits with `0` when every snapshot was fetched, `1` when the configuration
/// is invalid or the containers cannot be listed, and `2` when some snapshots
/// failed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run -- --application nova --exclude "['/nova_ssh']"
/// ```
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let config = match Config::try_from(Cli::parse()) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::from(1);
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.ok_log().is_some() {
                log::warn!("Interrupted, cancelling outstanding requests");
                cancel.cancel();
            }
        });
    }

    match docker_metrics::run(&config, &cancel).await {
        Ok(report) => {
            println!("{report}");
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(err) => {
            log::error!("[{}] {}", err.kind(), err);
            ExitCode::from(1)
        }
    }
}
