use crate::transport::{Completion, TERMINATOR};

use super::{Error, Result};

/// Status line and header block of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    /// Offset of the first body byte in the raw response.
    pub body_offset: usize,
}

/// How the body of a response is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Chunked,
    ContentLength(usize),
    /// Neither header present; the body runs until the peer stops sending.
    Unframed,
}

impl ResponseHead {
    /// Returns the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `204 No Content` and `304 Not Modified` never carry a body.
    pub fn is_bodiless(&self) -> bool {
        self.status == 204 || self.status == 304
    }

    /// Chunked transfer coding takes precedence over `Content-Length`.
    pub fn framing(&self) -> Result<Framing> {
        if let Some(coding) = self.header("Transfer-Encoding") {
            if coding
                .rsplit(',')
                .next()
                .is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
            {
                return Ok(Framing::Chunked);
            }
        }

        match self.header("Content-Length") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map(Framing::ContentLength)
                .map_err(|_| Error::InvalidContentLength(value.to_owned())),
            None => Ok(Framing::Unframed),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parses the status line and headers of `raw`.
///
/// Returns `Ok(None)` while the blank line ending the head has not arrived.
///
/// # Errors
///
/// - [`Error::NonUtf8Head`] if the head is not UTF-8.
/// - [`Error::MalformedStatusLine`] / [`Error::MalformedHeader`] on syntax errors.
pub fn parse_head(raw: &[u8]) -> Result<Option<ResponseHead>> {
    let Some(end) = find(raw, TERMINATOR) else {
        return Ok(None);
    };
    let head = std::str::from_utf8(&raw[..end]).map_err(|_| Error::NonUtf8Head)?;

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();
    let (version, status, reason) = parse_status_line(status_line)?;

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedHeader(line.to_owned()))?;
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(Error::MalformedHeader(line.to_owned()));
        }
        headers.push((name.to_owned(), value.trim().to_owned()));
    }

    Ok(Some(ResponseHead {
        version: version.to_owned(),
        status,
        reason: reason.to_owned(),
        headers,
        body_offset: end + TERMINATOR.len(),
    }))
}

fn parse_status_line(line: &str) -> Result<(&str, u16, &str)> {
    let malformed = || Error::MalformedStatusLine(line.to_owned());

    let (version, rest) = line.split_once(' ').ok_or_else(malformed)?;
    if !version.starts_with("HTTP/") {
        return Err(malformed());
    }
    let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
    if code.len() != 3 {
        return Err(malformed());
    }
    let status = code.parse::<u16>().map_err(|_| malformed())?;

    Ok((version, status, reason))
}

/// Walks the chunks of `body`, handing each chunk's data to `on_data`.
///
/// Returns the offset just past the trailer section once the last chunk has
/// arrived, `Ok(None)` before that. Only chunk-size lines are parsed; data is
/// skipped over by its declared size.
fn scan_chunks(body: &[u8], mut on_data: impl FnMut(&[u8])) -> Result<Option<usize>> {
    let mut pos = 0;

    loop {
        let Some(line_len) = find(&body[pos..], b"\r\n") else {
            return Ok(None);
        };
        let size_line = String::from_utf8_lossy(&body[pos..pos + line_len]);
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| Error::InvalidChunkSize(size_line.clone().into_owned()))?;
        pos += line_len + 2;

        if size == 0 {
            loop {
                let Some(line_len) = find(&body[pos..], b"\r\n") else {
                    return Ok(None);
                };
                pos += line_len + 2;
                if line_len == 0 {
                    return Ok(Some(pos));
                }
            }
        }

        let data_end = pos
            .checked_add(size)
            .ok_or_else(|| Error::InvalidChunkSize(size_line.clone().into_owned()))?;
        if body.len() < data_end + 2 {
            return Ok(None);
        }
        on_data(&body[pos..data_end]);
        if &body[data_end..data_end + 2] != b"\r\n" {
            return Err(Error::MissingChunkDelimiter);
        }
        pos = data_end + 2;
    }
}

/// Decodes a chunked body.
///
/// Returns `Ok(None)` if the last chunk and the trailer section have not
/// arrived yet. Chunk extensions and trailer fields are ignored.
pub fn decode_chunked(body: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut out = Vec::with_capacity(body.len());
    let end = scan_chunks(body, |data| out.extend_from_slice(data))?;
    Ok(end.map(|_| out))
}

/// Returns the first `\r\n`-separated section starting with `[` or `{`,
/// trimmed of trailing whitespace, or an empty string if there is none.
///
/// A header line that happens to start with a bracket is returned instead of
/// the body; [`decode_body`] only falls back to this when framing is absent.
pub fn extract_body(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .split("\r\n")
        .find(|section| section.starts_with('[') || section.starts_with('{'))
        .map(|section| section.trim_end().to_owned())
        .unwrap_or_default()
}

/// Returns the body of a complete raw response.
///
/// Precedence: `Transfer-Encoding: chunked`, then `Content-Length`, then the
/// [`extract_body`] heuristic over the body section. A response whose head
/// cannot be parsed at all is handed to the heuristic whole.
///
/// # Errors
///
/// Framing errors, invalid UTF-8 in a framed body, and [`Error::Status`] for
/// any non-2xx status.
pub fn decode_body(raw: &[u8]) -> Result<String> {
    let head = match parse_head(raw) {
        Ok(Some(head)) => head,
        Ok(None) => {
            log::debug!("response has no complete head, using bracket heuristic");
            return Ok(extract_body(raw));
        }
        Err(err) => {
            log::debug!("unparseable response head ({err}), using bracket heuristic");
            return Ok(extract_body(raw));
        }
    };

    let body = &raw[head.body_offset..];
    let text = match head.framing()? {
        Framing::Chunked => {
            let decoded = decode_chunked(body)?.ok_or(Error::IncompleteChunkedBody)?;
            String::from_utf8(decoded).map_err(Error::InvalidUtf8)?
        }
        Framing::ContentLength(expected) => {
            let content = body.get(..expected).ok_or(Error::IncompleteBody {
                expected,
                received: body.len(),
            })?;
            String::from_utf8(content.to_vec()).map_err(Error::InvalidUtf8)?
        }
        Framing::Unframed => extract_body(body),
    };

    if !head.is_success() {
        return Err(Error::Status {
            code: head.status,
            reason: head.reason,
            body: text.trim_end().to_owned(),
        });
    }

    Ok(text)
}

/// Completion check driven by the response's own framing.
///
/// Without framing headers it falls back to the trailing-terminator rule, and
/// it accepts the peer closing the stream once the head is in.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpCompletion;

impl Completion for HttpCompletion {
    fn is_complete(&self, received: &[u8]) -> bool {
        let head = match parse_head(received) {
            Ok(Some(head)) => head,
            Ok(None) => return false,
            Err(_) => return received.ends_with(TERMINATOR),
        };
        if head.is_bodiless() {
            return true;
        }

        let body = &received[head.body_offset..];
        match head.framing() {
            // a chunked message always ends with an empty line
            Ok(Framing::Chunked) => {
                received.ends_with(TERMINATOR) && !matches!(scan_chunks(body, |_| ()), Ok(None))
            }
            Ok(Framing::ContentLength(expected)) => body.len() >= expected,
            Ok(Framing::Unframed) => !body.is_empty() && received.ends_with(TERMINATOR),
            // let decode_body report it
            Err(_) => true,
        }
    }

    fn accepts_eof(&self, received: &[u8]) -> bool {
        match parse_head(received) {
            Ok(Some(head)) => {
                head.is_bodiless() || matches!(head.framing(), Ok(Framing::Unframed))
            }
            _ => false,
        }
    }
}
