//! Socket transport to the runtime management API.
//!
//! Every logical request opens its own connection through a [`Connect`]
//! implementation, writes the request in full and reads until a
//! [`Completion`] check accepts the response. Nothing is pooled or kept
//! across calls; the stream is dropped when the exchange ends, on success and
//! on error alike.
//!
//! The read loop is bounded three ways: a deadline covering connect, write and
//! read, a cap on accumulated response bytes, and a cancellation token.
mod endpoint;
mod error;
mod exchange;
#[cfg(test)]
pub(crate) mod testing;

pub use endpoint::{Connect, DEFAULT_SOCKET_PATH, Endpoint, EndpointStream, ParseEndpointError};
pub use error::{Error, Result};
pub use exchange::{
    Completion, DEFAULT_MAX_RESPONSE_BYTES, DEFAULT_READ_CHUNK_SIZE, DEFAULT_REQUEST_TIMEOUT,
    ExchangeOptions, TERMINATOR, TrailingTerminator, connect_until, send_and_receive,
    send_and_receive_until,
};
