//! TCP connection layer
//!
//! Blocking TCP with connect/read/write timeouts applied up front. One
//! connection maps to one remote destination; reuse across requests is
//! the fetcher's decision.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// TCP connection configuration
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Read timeout
    pub read_timeout: Option<Duration>,
    /// Write timeout
    pub write_timeout: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub nodelay: bool,
}

/// Idle/operation timeout, matching the advertised `Keep-Alive` window.
pub const IO_TIMEOUT: Duration = Duration::from_secs(20);

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: IO_TIMEOUT,
            read_timeout: Some(IO_TIMEOUT),
            write_timeout: Some(IO_TIMEOUT),
            nodelay: true,
        }
    }
}

/// Blocking TCP connection to a single `(host, port)` destination.
pub struct TcpConnection {
    stream: TcpStream,
    remote_addr: SocketAddr,
}

impl TcpConnection {
    /// Connect to `host:port` with the default config.
    pub fn connect(host: &str, port: u16) -> io::Result<Self> {
        Self::connect_with_config(host, port, TcpConfig::default())
    }

    /// Connect with a custom config.
    pub fn connect_with_config(host: &str, port: u16, config: TcpConfig) -> io::Result<Self> {
        let addr = resolve_host(host, port)?;
        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)?;

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        Ok(Self {
            stream,
            remote_addr: addr,
        })
    }

    /// Get remote address
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Take the inner stream (for TLS upgrade)
    pub fn into_inner(self) -> TcpStream {
        self.stream
    }

    /// Shutdown the connection
    pub fn shutdown(&self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Both)
    }
}

impl Read for TcpConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// DNS resolver helper
pub fn resolve_host(host: &str, port: u16) -> io::Result<SocketAddr> {
    let addr_str = format!("{}:{}", host, port);
    addr_str
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "DNS resolution failed"))
}
