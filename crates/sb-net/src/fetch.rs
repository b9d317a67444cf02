//! Fetcher
//!
//! Performs the request/response exchange for one resource locator.
//! A fetcher holds at most one live transport connection, reused across
//! same-host redirect hops and across requests when the server answers
//! with `Connection: Keep-Alive`. Dropping the fetcher closes the
//! connection.

use std::io::{self, BufRead, BufReader, Read};

use crate::http1::{self, GetRequest, ResponseHead};
use crate::locator::{ResourceLocator, Scheme};
use crate::tcp::TcpConnection;
use crate::tls::TlsStream;
use crate::NetError;

/// Number of 301 hops one top-level fetch may follow.
pub const REDIRECT_BUDGET: u32 = 5;

/// Transport-level fetch for one resource locator.
pub struct Fetcher {
    locator: ResourceLocator,
    conn: Option<Transport>,
}

impl Fetcher {
    /// Bind a fetcher to a locator. No connection is opened until the
    /// first request.
    pub fn new(locator: ResourceLocator) -> Self {
        Self {
            locator,
            conn: None,
        }
    }

    /// The locator this fetcher is bound to.
    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    /// Whether a transport connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Drop the held connection, if any.
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Perform the request and return the body text.
    pub fn fetch(&mut self) -> Result<String, NetError> {
        self.fetch_with_budget(REDIRECT_BUDGET)
    }

    /// Fetch with an explicit remaining redirect budget. Cross-host
    /// redirects hand the remaining budget to a fresh fetcher, so a
    /// chain of hops can never exceed the top-level allowance.
    fn fetch_with_budget(&mut self, budget: u32) -> Result<String, NetError> {
        match self.locator.effective_scheme() {
            Scheme::Data => {
                let mut body = self.locator.path.clone();
                body.push('\n');
                Ok(body)
            }
            Scheme::Unknown => Err(NetError::InvalidUrl(self.locator.path.clone())),
            Scheme::Ftp | Scheme::Mailto => {
                Err(NetError::UnsupportedScheme(self.locator.scheme.to_string()))
            }
            Scheme::Http | Scheme::Https | Scheme::File => {
                let locator = self.locator.clone();
                self.fetch_http(locator, budget)
            }
            // effective_scheme never yields ViewSource
            Scheme::ViewSource => Err(NetError::UnsupportedScheme(self.locator.scheme.to_string())),
        }
    }

    fn fetch_http(
        &mut self,
        mut locator: ResourceLocator,
        mut budget: u32,
    ) -> Result<String, NetError> {
        loop {
            let host = locator
                .host
                .clone()
                .ok_or_else(|| NetError::InvalidUrl(locator.path.clone()))?;
            let port = locator
                .port
                .ok_or_else(|| NetError::InvalidUrl(format!("no port for host {host}")))?;

            // Reuse the held connection when present; a fresh one is
            // TLS-wrapped exactly once, at establishment.
            let mut conn = match self.conn.take() {
                Some(conn) => conn,
                None => Transport::open(&host, port, locator.is_https())?,
            };

            let request = GetRequest {
                path: &locator.path,
                host: &host,
            };
            conn.send(&request)?;

            let head = ResponseHead::read_from(&mut conn)?;
            tracing::debug!(status = head.status, path = %locator.path, "response head");

            if head.status == 301 && budget > 0 {
                let location = head
                    .location()
                    .ok_or_else(|| {
                        NetError::MalformedResponse("redirect without location header".into())
                    })?
                    .to_string();
                budget -= 1;
                tracing::debug!(%location, remaining = budget, "following redirect");

                // The 301's body, if any, is left unread.
                let target = ResourceLocator::parse(&location)?;
                if target.scheme == Scheme::Unknown {
                    // A bare path: stay on this connection.
                    locator = locator.with_path(&location);
                    self.conn = Some(conn);
                } else if target.host == locator.host {
                    locator = locator.with_path(&target.path);
                    self.conn = Some(conn);
                } else {
                    // Different destination: fresh fetcher, fresh
                    // connection, remaining budget handed down.
                    return Fetcher::new(target).fetch_with_budget(budget);
                }
                continue;
            }

            if head.headers.contains("transfer-encoding") {
                return Err(NetError::UnsupportedFraming("transfer-encoding".into()));
            }
            if head.headers.contains("content-encoding") {
                return Err(NetError::UnsupportedFraming("content-encoding".into()));
            }
            let length = head.content_length().ok_or_else(|| {
                NetError::UnsupportedFraming("missing or invalid content-length".into())
            })?;

            let body = http1::read_body(&mut conn, length)?;

            // Persistence is signalled by the exact literal, matching
            // observed server behavior rather than a case-folded value.
            if head.headers.get("connection") == Some("Keep-Alive") {
                self.conn = Some(conn);
            } else {
                tracing::debug!(%host, port, "closing connection");
            }

            return Ok(String::from_utf8_lossy(&body).into_owned());
        }
    }
}

/// One live connection, plain or TLS-wrapped, with buffered reads.
/// Leftover buffered bytes survive across keep-alive requests.
enum Transport {
    Plain(BufReader<TcpConnection>),
    Tls(BufReader<TlsStream>),
}

impl Transport {
    fn open(host: &str, port: u16, tls: bool) -> Result<Self, NetError> {
        tracing::debug!(%host, port, tls, "opening connection");
        let tcp = TcpConnection::connect(host, port)?;
        if tls {
            let stream = TlsStream::connect(tcp, host)?;
            Ok(Transport::Tls(BufReader::new(stream)))
        } else {
            Ok(Transport::Plain(BufReader::new(tcp)))
        }
    }

    fn send(&mut self, request: &GetRequest<'_>) -> Result<(), NetError> {
        match self {
            Transport::Plain(reader) => request.write_to(reader.get_mut())?,
            Transport::Tls(reader) => request.write_to(reader.get_mut())?,
        }
        Ok(())
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(reader) => reader.read(buf),
            Transport::Tls(reader) => reader.read(buf),
        }
    }
}

impl BufRead for Transport {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Transport::Plain(reader) => reader.fill_buf(),
            Transport::Tls(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Transport::Plain(reader) => reader.consume(amt),
            Transport::Tls(reader) => reader.consume(amt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_no_connection() {
        let locator = ResourceLocator::parse("data:text/plain,Hello").unwrap();
        let mut fetcher = Fetcher::new(locator);

        assert_eq!(fetcher.fetch().unwrap(), "Hello\n");
        assert!(!fetcher.is_connected());
    }

    #[test]
    fn test_data_url_without_media() {
        let locator = ResourceLocator::parse("data:just text").unwrap();
        let mut fetcher = Fetcher::new(locator);
        assert_eq!(fetcher.fetch().unwrap(), "just text\n");
    }

    #[test]
    fn test_view_source_data_url() {
        let locator = ResourceLocator::parse("view-source:data:text/html,<b>hi</b>").unwrap();
        let mut fetcher = Fetcher::new(locator);
        assert_eq!(fetcher.fetch().unwrap(), "<b>hi</b>\n");
    }

    #[test]
    fn test_unknown_scheme_refused() {
        let locator = ResourceLocator::parse("gopher://example.com/1").unwrap();
        let mut fetcher = Fetcher::new(locator);

        let err = fetcher.fetch().unwrap_err();
        assert!(matches!(err, NetError::InvalidUrl(_)));
        assert!(!fetcher.is_connected());
    }

    #[test]
    fn test_ftp_scheme_refused() {
        let locator = ResourceLocator::parse("ftp://example.com/pub").unwrap();
        let mut fetcher = Fetcher::new(locator);

        let err = fetcher.fetch().unwrap_err();
        assert!(matches!(err, NetError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_mailto_refused() {
        let locator = ResourceLocator::parse("mailto:a@b.c").unwrap();
        let err = Fetcher::new(locator).fetch().unwrap_err();
        assert!(matches!(err, NetError::UnsupportedScheme(_)));
    }
}
