use std::string::FromUtf8Error;

/// Errors that may occur while framing a response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("response head is not valid UTF-8")]
    NonUtf8Head,
    #[error("malformed status line: `{0}`")]
    MalformedStatusLine(String),
    #[error("malformed header line: `{0}`")]
    MalformedHeader(String),
    #[error("invalid Content-Length: `{0}`")]
    InvalidContentLength(String),
    #[error("invalid chunk size line: `{0}`")]
    InvalidChunkSize(String),
    #[error("chunk data is not followed by CRLF")]
    MissingChunkDelimiter,
    #[error("chunked body ended before the last chunk")]
    IncompleteChunkedBody,
    #[error("body truncated: expected {expected} bytes, received {received}")]
    IncompleteBody { expected: usize, received: usize },
    #[error("response body is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] FromUtf8Error),
    #[error("runtime answered `{code} {reason}`: {body}")]
    Status {
        code: u16,
        reason: String,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
