use std::time::Duration;

use crate::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to `{endpoint}`: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write request: {0}")]
    Write(#[source] std::io::Error),
    #[error("connection broken: peer accepted none of the remaining {remaining} request bytes")]
    WriteZero { remaining: usize },
    #[error("failed to read response: {0}")]
    Read(#[source] std::io::Error),
    #[error("connection closed after {received} bytes, before the response was complete")]
    Unterminated { received: usize },
    #[error("response exceeded the limit of {limit} bytes")]
    TooLarge { limit: usize },
    #[error("request did not complete within {0:?}")]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connect { .. } => ErrorKind::Connection,
            Error::Write(_) | Error::WriteZero { .. } | Error::Read(_) => ErrorKind::Io,
            Error::Unterminated { .. } | Error::TooLarge { .. } => ErrorKind::Protocol,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
