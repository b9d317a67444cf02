//! TLS layer
//!
//! rustls client wrapping over an established TCP connection. The target
//! host is used for SNI and certificate verification against the
//! Mozilla root set.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

use crate::tcp::TcpConnection;

/// Create the rustls client configuration
fn create_client_config() -> Arc<ClientConfig> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
}

/// TLS stream wrapper over TCP using rustls
pub struct TlsStream {
    /// Rustls stream owning the connection
    stream: StreamOwned<ClientConnection, TcpStream>,
    /// Server name (SNI)
    server_name: String,
}

impl TlsStream {
    /// Wrap an existing TCP connection in TLS, handshaking eagerly.
    pub fn connect(tcp: TcpConnection, server_name: &str) -> io::Result<Self> {
        let config = create_client_config();

        let name: ServerName<'static> = server_name
            .to_string()
            .try_into()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Invalid server name"))?;

        let conn = ClientConnection::new(config, name)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        // StreamOwned drives the handshake transparently; flushing
        // forces it to complete before the first request is written.
        let mut stream = StreamOwned::new(conn, tcp.into_inner());
        stream.flush()?;

        tracing::debug!(server = server_name, "TLS handshake complete");

        Ok(Self {
            stream,
            server_name: server_name.to_string(),
        })
    }

    /// Get server name
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Initiate shutdown
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.stream.conn.send_close_notify();
        self.stream.flush()
    }
}

impl Read for TlsStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TlsStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_config() {
        let config = create_client_config();
        assert!(config.alpn_protocols.is_empty());
    }

    #[test]
    fn test_invalid_server_name() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let tcp = TcpConnection::connect("127.0.0.1", port).unwrap();

        // An IP literal with a stray bracket is not a valid SNI name.
        assert!(TlsStream::connect(tcp, "bad[name").is_err());
    }
}
