//! Minimal HTTP/1.1 framing for the runtime management API.
//!
//! Requests are a bare request line. Responses are split into head and body
//! using the declared framing, with the bracket heuristic of
//! [`extract_body`] as the fallback for responses that declare none.
mod error;
mod request;
mod response;

pub use error::{Error, Result};
pub use request::{HTTP_VERSION, build_request, build_request_with_host};
pub use response::{
    Framing, HttpCompletion, ResponseHead, decode_body, decode_chunked, extract_body, parse_head,
};
