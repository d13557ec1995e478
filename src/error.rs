use std::fmt;

use crate::{config, docker};

/// Coarse classification shared by every error in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The endpoint could not be reached.
    Connection,
    /// Reading from or writing to an open connection failed.
    Io,
    /// The peer answered with something that is not a usable response.
    Protocol,
    Timeout,
    Cancelled,
    Configuration,
    /// A request task crashed instead of returning a result.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Io => "io",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Failures that end a run before any stats are collected.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::Error),
    #[error("failed to list containers at `{endpoint}`: {source}")]
    Enumeration {
        endpoint: String,
        #[source]
        source: docker::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(err) => err.kind(),
            Error::Enumeration { source, .. } => source.kind(),
        }
    }
}

pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
