pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Builds a header-less request: `METHOD PATH HTTP/1.1\r\n\r\n`.
///
/// This is only enough for a server that tolerates requests without a `Host`
/// line over a local socket. It is not a general HTTP client.
pub fn build_request(method: &str, path: &str) -> Vec<u8> {
    format!("{method} {path} {HTTP_VERSION}\r\n\r\n").into_bytes()
}

/// Builds a request carrying a single `Host` header.
pub fn build_request_with_host(method: &str, path: &str, host: &str) -> Vec<u8> {
    format!("{method} {path} {HTTP_VERSION}\r\nHost: {host}\r\n\r\n").into_bytes()
}
