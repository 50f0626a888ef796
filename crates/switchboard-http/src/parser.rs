//! HTTP request parsing.
//!
//! Reads one request from a buffered stream: request line, headers, then a
//! `Content-Length`-delimited body decoded as UTF-8 text. The query string
//! is split off and discarded (routing never consults it), and the path is
//! percent-decoded before it reaches the dispatcher.

use std::io::{self, BufRead, Read};

use switchboard_core::{Method, Request};

/// HTTP parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid request line.
    InvalidRequestLine,
    /// Unknown or non-canonical HTTP method.
    InvalidMethod,
    /// Not an HTTP/1.x version token.
    UnsupportedVersion,
    /// The path is missing its leading `/` or carries broken
    /// percent-encoding.
    InvalidPath,
    /// A header line without a `:` separator.
    InvalidHeader,
    /// Unparseable `Content-Length` value.
    InvalidContentLength,
    /// The body is not valid UTF-8.
    BodyNotUtf8,
    /// Request line exceeds the configured limit.
    RequestLineTooLong,
    /// A header line exceeds the configured limit.
    HeaderLineTooLong,
    /// More headers than the configured limit.
    TooManyHeaders,
    /// Declared body larger than the configured limit.
    BodyTooLarge,
    /// The stream ended before the declared body arrived.
    UnexpectedEof,
    /// An I/O failure while reading.
    Io(io::ErrorKind),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::InvalidMethod => write!(f, "invalid HTTP method"),
            Self::UnsupportedVersion => write!(f, "unsupported HTTP version"),
            Self::InvalidPath => write!(f, "invalid request path"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::InvalidContentLength => write!(f, "invalid content-length"),
            Self::BodyNotUtf8 => write!(f, "request body is not valid UTF-8"),
            Self::RequestLineTooLong => write!(f, "request line too long"),
            Self::HeaderLineTooLong => write!(f, "header line too long"),
            Self::TooManyHeaders => write!(f, "too many headers"),
            Self::BodyTooLarge => write!(f, "request body too large"),
            Self::UnexpectedEof => write!(f, "incomplete request"),
            Self::Io(kind) => write!(f, "read failed: {:?}", kind),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            kind => Self::Io(kind),
        }
    }
}

/// Parsing limits.
#[derive(Debug, Clone)]
pub struct ParseLimits {
    /// Maximum request line length in bytes.
    pub max_request_line_len: usize,
    /// Maximum number of headers.
    pub max_header_count: usize,
    /// Maximum length of a single header line.
    pub max_header_line_len: usize,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_request_line_len: 8 * 1024,
            max_header_count: 100,
            max_header_line_len: 8 * 1024,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Read and parse one request from a buffered stream.
///
/// # Errors
///
/// Any [`ParseError`]; the caller answers those with a 400 and closes the
/// connection.
pub fn read_request<R: BufRead>(reader: &mut R, limits: &ParseLimits) -> Result<Request, ParseError> {
    let request_line = read_line(reader, limits.max_request_line_len, ParseError::RequestLineTooLong)?;
    if request_line.is_empty() {
        return Err(ParseError::UnexpectedEof);
    }

    let (method, path) = parse_request_line(&request_line)?;

    let mut content_length = 0usize;
    let mut header_count = 0usize;
    loop {
        let line = read_line(reader, limits.max_header_line_len, ParseError::HeaderLineTooLong)?;
        if line.is_empty() {
            break;
        }
        header_count += 1;
        if header_count > limits.max_header_count {
            return Err(ParseError::TooManyHeaders);
        }

        let (name, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
        }
    }

    if content_length > limits.max_body_size {
        return Err(ParseError::BodyTooLarge);
    }

    let mut body_bytes = vec![0u8; content_length];
    reader.read_exact(&mut body_bytes)?;
    let body = String::from_utf8(body_bytes).map_err(|_| ParseError::BodyNotUtf8)?;

    Ok(Request {
        method,
        path,
        body,
    })
}

/// Parse `METHOD SP path[?query] SP HTTP/1.x` into `(method, decoded path)`.
fn parse_request_line(line: &str) -> Result<(Method, String), ParseError> {
    let mut parts = line.split(' ');
    let method_token = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let uri = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    let version = parts.next().ok_or(ParseError::InvalidRequestLine)?;
    if parts.next().is_some() || method_token.is_empty() || uri.is_empty() {
        return Err(ParseError::InvalidRequestLine);
    }

    let method = Method::parse(method_token).ok_or(ParseError::InvalidMethod)?;

    if !matches!(version, "HTTP/1.1" | "HTTP/1.0") {
        return Err(ParseError::UnsupportedVersion);
    }

    // Routing never consults the query string; it is split off here.
    let raw_path = match uri.split_once('?') {
        Some((path, _query)) => path,
        None => uri,
    };
    if !raw_path.starts_with('/') {
        return Err(ParseError::InvalidPath);
    }
    let path = percent_decode(raw_path).ok_or(ParseError::InvalidPath)?;

    Ok((method, path))
}

/// Decode a percent-encoded path.
///
/// Returns `None` on truncated or non-hex escapes, or when the decoded
/// bytes are not UTF-8.
#[must_use]
pub fn percent_decode(s: &str) -> Option<String> {
    let mut decoded = Vec::with_capacity(s.len());
    let mut bytes = s.bytes();

    while let Some(byte) = bytes.next() {
        if byte == b'%' {
            let hi = char::from(bytes.next()?).to_digit(16)?;
            let lo = char::from(bytes.next()?).to_digit(16)?;
            decoded.push((hi * 16 + lo) as u8);
        } else {
            decoded.push(byte);
        }
    }

    String::from_utf8(decoded).ok()
}

/// Read one CRLF- (or LF-) terminated line, without its terminator.
///
/// An empty string means either a blank line or a clean EOF.
fn read_line<R: BufRead>(
    reader: &mut R,
    max_len: usize,
    too_long: ParseError,
) -> Result<String, ParseError> {
    let mut line = String::new();
    // Bound the read so an endless line cannot grow the buffer unchecked.
    let read = reader.by_ref().take(max_len as u64 + 1).read_line(&mut line)?;
    if read > max_len {
        return Err(too_long);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}
