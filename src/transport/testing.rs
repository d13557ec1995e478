//! Simulated connections for exercising the request path without a runtime.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use super::{Connect, Error, Result};

/// What a simulated peer does once it has seen the request.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Send these bytes, then close.
    Bytes(Vec<u8>),
    /// Never answer.
    Stall,
}

type Handler = dyn Fn(&str) -> Reply + Send + Sync;

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    connects: AtomicUsize,
}

/// A [`Connect`] implementation that answers every request through a handler.
#[derive(Clone)]
pub(crate) struct MockConnector {
    handler: Arc<Handler>,
    delay: Duration,
    refuse: bool,
    max_write: usize,
    read_chunk: usize,
    counters: Arc<Counters>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub(crate) fn new(handler: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            delay: Duration::ZERO,
            refuse: false,
            max_write: usize::MAX,
            read_chunk: usize::MAX,
            counters: Arc::default(),
            requests: Arc::default(),
        }
    }

    /// Answers every request with `status` and a `Content-Length` framed JSON body.
    pub(crate) fn json(status: &str, body: &str) -> Self {
        let response = http_response(status, body);
        Self::new(move |_| Reply::Bytes(response.clone()))
    }

    /// Sleeps this long before every connection is handed out.
    pub(crate) fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fails every connection attempt with `ConnectionRefused`.
    pub(crate) fn refusing() -> Self {
        let mut connector = Self::new(|_| Reply::Stall);
        connector.refuse = true;
        connector
    }

    /// Caps the bytes accepted per write; `0` simulates a broken connection.
    pub(crate) fn max_write(mut self, max_write: usize) -> Self {
        self.max_write = max_write;
        self
    }

    /// Caps the bytes handed out per read.
    pub(crate) fn read_chunk(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk;
        self
    }

    pub(crate) fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    /// Highest number of connections that were open at the same time.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl fmt::Display for MockConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mock://runtime")
    }
}

impl Connect for MockConnector {
    type Stream = MockStream;

    fn connect(&self) -> impl Future<Output = Result<Self::Stream>> + Send {
        async move {
            self.counters.connects.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.refuse {
                return Err(Error::Connect {
                    endpoint: self.to_string(),
                    source: io::Error::from(io::ErrorKind::ConnectionRefused),
                });
            }

            let in_flight = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.peak.fetch_max(in_flight, Ordering::SeqCst);

            Ok(MockStream {
                handler: Arc::clone(&self.handler),
                max_write: self.max_write,
                read_chunk: self.read_chunk,
                counters: Arc::clone(&self.counters),
                requests: Arc::clone(&self.requests),
                written: Vec::new(),
                reply: None,
                offset: 0,
            })
        }
    }
}

pub(crate) struct MockStream {
    handler: Arc<Handler>,
    max_write: usize,
    read_chunk: usize,
    counters: Arc<Counters>,
    requests: Arc<Mutex<Vec<String>>>,
    written: Vec<u8>,
    reply: Option<Reply>,
    offset: usize,
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.reply.is_none() {
            let request = String::from_utf8_lossy(&this.written).into_owned();
            this.reply = Some((this.handler)(&request));
            this.requests.lock().unwrap().push(request);
        }

        match &this.reply {
            Some(Reply::Bytes(bytes)) => {
                let remaining = &bytes[this.offset..];
                let n = remaining.len().min(buf.remaining()).min(this.read_chunk);
                buf.put_slice(&remaining[..n]);
                this.offset += n;
                Poll::Ready(Ok(()))
            }
            Some(Reply::Stall) | None => Poll::Pending,
        }
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let n = buf.len().min(this.max_write);
        this.written.extend_from_slice(&buf[..n]);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Builds a `Content-Length` framed response.
pub(crate) fn http_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}
