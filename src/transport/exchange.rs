use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::{Connect, Error, Result};

/// Marker that ends a response under the legacy framing rule.
pub const TERMINATOR: &[u8] = b"\r\n\r\n";

pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds applied to a single request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeOptions {
    /// Deadline for the whole exchange, connect included.
    pub timeout: Duration,
    /// Upper bound on accumulated response bytes.
    pub max_response_bytes: usize,
    /// Size of each read from the stream.
    pub read_chunk_size: usize,
}

impl Default for ExchangeOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Decides when the bytes accumulated so far form a whole response.
pub trait Completion {
    fn is_complete(&self, received: &[u8]) -> bool;

    /// Whether the peer closing the stream ends the response successfully.
    fn accepts_eof(&self, _received: &[u8]) -> bool {
        false
    }
}

/// Complete once the accumulated tail equals [`TERMINATOR`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingTerminator;

impl Completion for TrailingTerminator {
    fn is_complete(&self, received: &[u8]) -> bool {
        received.ends_with(TERMINATOR)
    }
}

/// Opens a connection through `connector`, bounded by `deadline` and `cancel`.
pub async fn connect_until<C: Connect>(
    connector: &C,
    deadline: Instant,
    options: &ExchangeOptions,
    cancel: &CancellationToken,
) -> Result<C::Stream> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        connected = tokio::time::timeout_at(deadline, connector.connect()) => {
            connected.map_err(|_| Error::Timeout(options.timeout))?
        }
    }
}

/// Writes `request` to `stream` and reads until `completion` accepts the response.
///
/// The exchange is bounded by `options.timeout` from the moment of the call.
///
/// # Errors
///
/// - [`Error::Write`] / [`Error::WriteZero`] if the request cannot be sent in full.
/// - [`Error::Read`] if reading fails.
/// - [`Error::Unterminated`] if the peer closes before the response is complete.
/// - [`Error::TooLarge`] if the response exceeds `options.max_response_bytes`.
/// - [`Error::Timeout`] / [`Error::Cancelled`] if the exchange is cut short.
pub async fn send_and_receive<S, C>(
    stream: &mut S,
    request: &[u8],
    options: &ExchangeOptions,
    cancel: &CancellationToken,
    completion: &C,
) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Completion + ?Sized,
{
    let deadline = Instant::now() + options.timeout;
    send_and_receive_until(stream, request, options, deadline, cancel, completion).await
}

/// Same as [`send_and_receive`], with an explicit deadline shared with the connect step.
pub async fn send_and_receive_until<S, C>(
    stream: &mut S,
    request: &[u8],
    options: &ExchangeOptions,
    deadline: Instant,
    cancel: &CancellationToken,
    completion: &C,
) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
    C: Completion + ?Sized,
{
    let exchange = async {
        write_request(stream, request).await?;
        read_response(stream, options, completion).await
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = tokio::time::timeout_at(deadline, exchange) => {
            result.map_err(|_| Error::Timeout(options.timeout))?
        }
    }
}

async fn write_request<S>(stream: &mut S, request: &[u8]) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut sent = 0;
    while sent < request.len() {
        let n = stream.write(&request[sent..]).await.map_err(Error::Write)?;
        if n == 0 {
            return Err(Error::WriteZero {
                remaining: request.len() - sent,
            });
        }
        sent += n;
    }
    stream.flush().await.map_err(Error::Write)?;
    log::trace!("sent {} request bytes", sent);

    Ok(())
}

async fn read_response<S, C>(
    stream: &mut S,
    options: &ExchangeOptions,
    completion: &C,
) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
    C: Completion + ?Sized,
{
    let mut response = Vec::with_capacity(options.read_chunk_size);
    let mut chunk = vec![0u8; options.read_chunk_size.max(1)];

    loop {
        let n = stream.read(&mut chunk).await.map_err(Error::Read)?;
        if n == 0 {
            if completion.accepts_eof(&response) {
                return Ok(response);
            }
            return Err(Error::Unterminated {
                received: response.len(),
            });
        }

        if response.len() + n > options.max_response_bytes {
            return Err(Error::TooLarge {
                limit: options.max_response_bytes,
            });
        }
        response.extend_from_slice(&chunk[..n]);

        if completion.is_complete(&response) {
            log::trace!("received {} response bytes", response.len());
            return Ok(response);
        }
    }
}
