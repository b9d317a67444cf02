//! Resource Locator
//!
//! Parses a URL string into its scheme, host, port, path, and the
//! scheme-specific fields of `data:` and `view-source:` URLs. Parsing is
//! pure and synchronous; no network access happens here.

use crate::NetError;

/// URL scheme classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    Ftp,
    File,
    Mailto,
    ViewSource,
    Data,
    Unknown,
}

impl Scheme {
    /// Classify a scheme token. Unrecognized tokens become `Unknown`
    /// rather than an error; the fetcher refuses them later.
    pub fn classify(token: &str) -> Self {
        match token {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "ftp" => Scheme::Ftp,
            "file" => Scheme::File,
            "mailto" => Scheme::Mailto,
            "view-source" => Scheme::ViewSource,
            "data" => Scheme::Data,
            _ => Scheme::Unknown,
        }
    }

    /// Default port for the scheme, if it has one.
    pub fn default_port(self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ftp => "ftp",
            Scheme::File => "file",
            Scheme::Mailto => "mailto",
            Scheme::ViewSource => "view-source",
            Scheme::Data => "data",
            Scheme::Unknown => "unknown",
        };
        write!(f, "{token}")
    }
}

/// Host and port the `file` scheme always resolves to, where the local
/// demo server is expected to listen.
const FILE_HOST: &str = "localhost";
const FILE_PORT: u16 = 8000;

/// Parsed representation of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    pub scheme: Scheme,
    /// Scheme of the wrapped URL when `scheme` is `ViewSource`.
    pub underlying_scheme: Option<Scheme>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Request path, with query and fragment folded in. For `data:`
    /// URLs this holds the inline payload instead.
    pub path: String,
    /// MIME type prefix of a `data:` URL.
    pub media: Option<String>,
}

impl ResourceLocator {
    /// Parse a URL string.
    ///
    /// A missing or unrecognized scheme token classifies as `Unknown`
    /// with the raw input preserved as the path; only structurally
    /// broken inputs (e.g. a non-numeric port) are errors.
    pub fn parse(url: &str) -> Result<Self, NetError> {
        let url = url.trim();

        if let Some(rest) = url.strip_prefix("view-source:") {
            let inner = Self::parse(rest)?;
            return Ok(Self {
                scheme: Scheme::ViewSource,
                underlying_scheme: Some(inner.scheme),
                ..inner
            });
        }

        let (token, rest) = match url.split_once(':') {
            Some((token, rest)) => (token, rest),
            None => ("", url),
        };
        let scheme = Scheme::classify(token);

        match scheme {
            Scheme::Data => {
                let (media, payload) = match rest.split_once(',') {
                    Some((media, payload)) => (Some(media.to_string()), payload),
                    None => (None, rest),
                };
                Ok(Self {
                    scheme,
                    underlying_scheme: None,
                    host: None,
                    port: None,
                    path: payload.to_string(),
                    media,
                })
            }
            Scheme::Mailto => Ok(Self {
                scheme,
                underlying_scheme: None,
                host: None,
                port: None,
                path: rest.to_string(),
                media: None,
            }),
            Scheme::Unknown => Ok(Self {
                scheme,
                underlying_scheme: None,
                host: None,
                port: None,
                path: url.to_string(),
                media: None,
            }),
            Scheme::Http | Scheme::Https | Scheme::Ftp | Scheme::File => {
                Self::parse_authority(scheme, rest, url)
            }
            // stripped above
            Scheme::ViewSource => Err(NetError::InvalidUrl(url.to_string())),
        }
    }

    fn parse_authority(scheme: Scheme, rest: &str, url: &str) -> Result<Self, NetError> {
        let rest = rest.strip_prefix("//").unwrap_or(rest);

        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        // Userinfo is accepted but not modeled.
        let authority = match authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => authority,
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port: u16 = port
                    .parse()
                    .map_err(|_| NetError::InvalidUrl(format!("invalid port in {url}")))?;
                (host.to_string(), Some(port))
            }
            None => (authority.to_string(), None),
        };

        let mut locator = Self {
            scheme,
            underlying_scheme: None,
            host: Some(host),
            port: port.or_else(|| scheme.default_port()),
            path: path.to_string(),
            media: None,
        };

        // The file scheme always points at the local demo server.
        if scheme == Scheme::File {
            locator.host = Some(FILE_HOST.to_string());
            locator.port = Some(FILE_PORT);
        }

        Ok(locator)
    }

    /// Scheme that decides transport behavior: the wrapped scheme for
    /// view-source, otherwise the scheme itself.
    pub fn effective_scheme(&self) -> Scheme {
        match self.scheme {
            Scheme::ViewSource => self.underlying_scheme.unwrap_or(Scheme::Unknown),
            scheme => scheme,
        }
    }

    /// Whether the transport must be TLS-wrapped.
    pub fn is_https(&self) -> bool {
        self.effective_scheme() == Scheme::Https
    }

    /// New locator for a different path on the same destination.
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..self.clone()
        }
    }
}
