use std::fmt;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpStream, UnixStream};

use super::{Error, Result};

/// Default location of the runtime management socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";

/// Opens one fresh connection per call.
///
/// Implementors must not pool or reuse connections: every logical request owns
/// the stream it gets back and drops it when the exchange ends.
pub trait Connect: fmt::Display + Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(&self) -> impl Future<Output = Result<Self::Stream>> + Send;
}

/// Address of the runtime management API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A Unix domain socket at the given filesystem path.
    Unix(PathBuf),
    /// A TCP `host:port` address.
    Tcp(String),
}

impl Endpoint {
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Endpoint::Unix(path.into())
    }

    pub fn tcp(addr: impl Into<String>) -> Self {
        Endpoint::Tcp(addr.into())
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::unix(DEFAULT_SOCKET_PATH)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error(
    "invalid endpoint `{0}`: expected `unix://<path>`, `tcp://<host>:<port>` or an absolute socket path"
)]
pub struct ParseEndpointError(pub String);

impl FromStr for Endpoint {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(ParseEndpointError(s.to_owned()));
            }
            return Ok(Endpoint::unix(path));
        }

        if let Some(addr) = s.strip_prefix("tcp://") {
            let addr = addr.trim_end_matches('/');
            match addr.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    return Ok(Endpoint::tcp(addr));
                }
                _ => return Err(ParseEndpointError(s.to_owned())),
            }
        }

        if s.starts_with('/') {
            return Ok(Endpoint::unix(s));
        }

        Err(ParseEndpointError(s.to_owned()))
    }
}

impl Connect for Endpoint {
    type Stream = EndpointStream;

    fn connect(&self) -> impl Future<Output = Result<Self::Stream>> + Send {
        async move {
            log::trace!("Connecting to {}...", self);
            let stream = match self {
                Endpoint::Unix(path) => UnixStream::connect(path).await.map(EndpointStream::Unix),
                Endpoint::Tcp(addr) => TcpStream::connect(addr.as_str())
                    .await
                    .map(EndpointStream::Tcp),
            }
            .map_err(|source| Error::Connect {
                endpoint: self.to_string(),
                source,
            })?;
            log::trace!("Connected to {}.", self);

            Ok(stream)
        }
    }
}

/// A connected stream to an [`Endpoint`].
#[derive(Debug)]
pub enum EndpointStream {
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl AsyncRead for EndpointStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            EndpointStream::Unix(stream) => Pin::new(stream).poll_read(cx, buf),
            EndpointStream::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for EndpointStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            EndpointStream::Unix(stream) => Pin::new(stream).poll_write(cx, buf),
            EndpointStream::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            EndpointStream::Unix(stream) => Pin::new(stream).poll_flush(cx),
            EndpointStream::Tcp(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            EndpointStream::Unix(stream) => Pin::new(stream).poll_shutdown(cx),
            EndpointStream::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
