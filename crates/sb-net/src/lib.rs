//! SimpleBrowser networking
//!
//! URL resolution and the HTTP/1.1 transport: locator parsing, blocking
//! TCP/TLS connections, GET request framing, and a redirect-following
//! fetch with keep-alive connection reuse.

pub mod fetch;
pub mod http1;
pub mod locator;
pub mod tcp;
pub mod tls;

pub use fetch::{Fetcher, REDIRECT_BUDGET};
pub use http1::{GetRequest, ResponseHead, ResponseHeaders};
pub use locator::{ResourceLocator, Scheme};
pub use tcp::{TcpConfig, TcpConnection};
pub use tls::TlsStream;

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unsupported response framing: {0}")]
    UnsupportedFraming(String),
}
