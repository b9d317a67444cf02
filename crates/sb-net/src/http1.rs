//! HTTP/1.1 framing
//!
//! GET request serialization and response head parsing. Body framing is
//! content-length only; chunked and compressed responses are refused by
//! the fetcher before any body byte is read.

use std::collections::HashMap;
use std::io::{self, BufRead, Read, Write};

use crate::NetError;

/// GET request for one path on one host, serialized with CRLF line
/// endings exactly as sent on the wire.
#[derive(Debug, Clone)]
pub struct GetRequest<'a> {
    pub path: &'a str,
    pub host: &'a str,
}

/// User-Agent header value sent with every request.
pub const USER_AGENT: &str = "SimpleBrowser/0.1";

impl GetRequest<'_> {
    /// Serialize to bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut request = format!("GET {} HTTP/1.1\r\n", self.path);
        request.push_str(&format!("Host: {}\r\n", self.host));
        request.push_str("Connection: keep-alive\r\n");
        request.push_str("Keep-Alive: timeout=20\r\n");
        request.push_str(&format!("User-Agent: {USER_AGENT}\r\n"));
        request.push_str("\r\n");
        request.into_bytes()
    }

    /// Write to a stream
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.serialize())?;
        writer.flush()
    }
}

/// Response header map: lower-cased names, trimmed values, rebuilt
/// fresh for each response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    map: HashMap<String, String>,
}

impl ResponseHeaders {
    /// Parse one `Name: value` line into the map.
    pub fn insert_line(&mut self, line: &str) -> Result<(), NetError> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| NetError::MalformedResponse(format!("header line {line:?}")))?;
        self.map
            .insert(name.to_ascii_lowercase(), value.trim().to_string());
        Ok(())
    }

    /// Look up a header by its lower-cased name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Parsed status line and headers; the body has not been read yet.
#[derive(Debug)]
pub struct ResponseHead {
    /// HTTP version token, e.g. `HTTP/1.1`
    pub version: String,
    /// Status code
    pub status: u16,
    /// Reason phrase
    pub explanation: String,
    /// Response headers
    pub headers: ResponseHeaders,
}

impl ResponseHead {
    /// Read the status line and header block, leaving the reader
    /// positioned at the first body byte.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, NetError> {
        let status_line = read_line(reader)?;
        let mut parts = status_line.splitn(3, ' ');

        let version = parts
            .next()
            .ok_or_else(|| NetError::MalformedResponse("empty status line".into()))?
            .to_string();
        let status: u16 = parts
            .next()
            .ok_or_else(|| NetError::MalformedResponse("missing status code".into()))?
            .parse()
            .map_err(|_| NetError::MalformedResponse(format!("status line {status_line:?}")))?;
        let explanation = parts.next().unwrap_or("").to_string();

        let mut headers = ResponseHeaders::default();
        loop {
            let line = read_line(reader)?;
            if line.is_empty() {
                break;
            }
            headers.insert_line(&line)?;
        }

        Ok(Self {
            version,
            status,
            explanation,
            headers,
        })
    }

    /// Get Content-Length
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length").and_then(|v| v.parse().ok())
    }

    /// Get redirect location
    pub fn location(&self) -> Option<&str> {
        self.headers.get("location")
    }
}

/// Read one CRLF-terminated line, without the terminator.
fn read_line<R: BufRead>(reader: &mut R) -> Result<String, NetError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(NetError::MalformedResponse(
            "connection closed mid-response".into(),
        ));
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

/// Size of each bounded body read.
const BODY_CHUNK: usize = 4096;

/// Read up to `len` body bytes in bounded chunks. A stream that ends
/// early yields the partial body rather than an error.
pub fn read_body<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, NetError> {
    let mut body = Vec::with_capacity(len.min(64 * 1024));
    let mut chunk = [0u8; BODY_CHUNK];

    while body.len() < len {
        let want = (len - body.len()).min(BODY_CHUNK);
        let n = match reader.read(&mut chunk[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            tracing::warn!(read = body.len(), expected = len, "response body truncated");
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn test_request_serialize() {
        let req = GetRequest {
            path: "/index.html",
            host: "example.com",
        };
        let wire = String::from_utf8(req.serialize()).unwrap();

        assert_eq!(
            wire,
            "GET /index.html HTTP/1.1\r\n\
             Host: example.com\r\n\
             Connection: keep-alive\r\n\
             Keep-Alive: timeout=20\r\n\
             User-Agent: SimpleBrowser/0.1\r\n\
             \r\n"
        );
    }

    #[test]
    fn test_response_head_parse() {
        let raw = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 5\r\n\r\nHello";
        let mut reader = BufReader::new(raw.as_bytes());

        let head = ResponseHead::read_from(&mut reader).unwrap();
        assert_eq!(head.version, "HTTP/1.1");
        assert_eq!(head.status, 200);
        assert_eq!(head.explanation, "OK");
        assert_eq!(head.headers.get("content-type"), Some("text/html"));
        assert_eq!(head.content_length(), Some(5));

        // Body bytes stay in the reader.
        let body = read_body(&mut reader, 5).unwrap();
        assert_eq!(body, b"Hello");
    }

    #[test]
    fn test_header_names_case_folded_values_trimmed() {
        let raw = "HTTP/1.1 200 OK\r\nX-Custom:   spaced out  \r\n\r\n";
        let mut reader = BufReader::new(raw.as_bytes());

        let head = ResponseHead::read_from(&mut reader).unwrap();
        assert_eq!(head.headers.get("x-custom"), Some("spaced out"));
    }

    #[test]
    fn test_header_value_keeps_colons() {
        let raw = "HTTP/1.1 200 OK\r\nLocation: http://example.com/\r\n\r\n";
        let mut reader = BufReader::new(raw.as_bytes());

        let head = ResponseHead::read_from(&mut reader).unwrap();
        assert_eq!(head.location(), Some("http://example.com/"));
    }

    #[test]
    fn test_multi_word_explanation() {
        let raw = "HTTP/1.1 301 Moved Permanently\r\n\r\n";
        let mut reader = BufReader::new(raw.as_bytes());

        let head = ResponseHead::read_from(&mut reader).unwrap();
        assert_eq!(head.status, 301);
        assert_eq!(head.explanation, "Moved Permanently");
    }

    #[test]
    fn test_malformed_status_line() {
        let raw = "HTTP/1.1 notastatus OK\r\n\r\n";
        let mut reader = BufReader::new(raw.as_bytes());

        assert!(ResponseHead::read_from(&mut reader).is_err());
    }

    #[test]
    fn test_closed_before_status_line() {
        let mut reader = BufReader::new(&b""[..]);
        assert!(ResponseHead::read_from(&mut reader).is_err());
    }

    #[test]
    fn test_read_body_truncated() {
        let mut reader = BufReader::new(&b"hello"[..]);
        let body = read_body(&mut reader, 100).unwrap();
        assert_eq!(body, b"hello");
    }

    #[test]
    fn test_read_body_stops_at_length() {
        let mut reader = BufReader::new(&b"hello world and more"[..]);
        let body = read_body(&mut reader, 11).unwrap();
        assert_eq!(body, b"hello world");
    }
}
