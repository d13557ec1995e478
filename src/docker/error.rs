use crate::error::ErrorKind;
use crate::{container, http, transport};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] transport::Error),
    #[error("invalid response for `{path}`: {source}")]
    Http {
        path: String,
        #[source]
        source: http::Error,
    },
    #[error("invalid JSON body for `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("runtime listed an invalid container: {0}")]
    Container(#[from] container::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(err) => err.kind(),
            Error::Http { .. } | Error::Json { .. } | Error::Container(_) => ErrorKind::Protocol,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
