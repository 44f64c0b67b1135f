// Transport bindings for the ubus JSON-RPC endpoint.
//
// An endpoint resolves once, at client construction, to one of two bindings:
// HTTP(S) POST against uhttpd's `/ubus` handler, or HTTP/1.1 POST over the
// router-local unix socket. Both take a serialized envelope and hand back the
// raw response body; anything but `200 OK` is a transport failure.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tokio::net::UnixStream;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;

/// Socket rpcd listens on when no endpoint is configured.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/ubus/ubus.sock";

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Deadline for establishing the unix socket connection.
const SOCKET_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

const USER_AGENT: &str = concat!("ubusly/", env!("CARGO_PKG_VERSION"));

// ── Endpoint ─────────────────────────────────────────────────────────

/// Where the ubus JSON-RPC handler lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// uhttpd's ubus handler, e.g. `https://192.168.1.1/ubus`.
    Http(Url),
    /// A local unix socket.
    UnixSocket(PathBuf),
}

impl Endpoint {
    /// Resolve an endpoint string.
    ///
    /// - empty: the default socket at [`DEFAULT_SOCKET_PATH`]
    /// - `http://` / `https://`: HTTP POST to exactly that URL
    /// - `unix:///path` or a bare filesystem path: the socket at that path
    /// - any other scheme is rejected
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::UnixSocket(PathBuf::from(DEFAULT_SOCKET_PATH)));
        }

        match Url::parse(raw) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Http(url)),
                "unix" => Ok(Self::UnixSocket(PathBuf::from(url.path()))),
                other => Err(Error::UnsupportedTransport(other.to_owned())),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Self::UnixSocket(PathBuf::from(raw)))
            }
            Err(e) => Err(Error::InvalidUrl(e)),
        }
    }

    /// The socket path, if this is a socket endpoint.
    pub fn socket_path(&self) -> Option<&Path> {
        match self {
            Self::UnixSocket(path) => Some(path),
            Self::Http(_) => None,
        }
    }

    /// The URL, if this is an HTTP endpoint.
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Http(url) => Some(url),
            Self::UnixSocket(_) => None,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::UnixSocket(PathBuf::from(DEFAULT_SOCKET_PATH))
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::UnixSocket(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

// ── Transport configuration ──────────────────────────────────────────

/// TLS verification mode for HTTPS endpoints.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (routers ship self-signed ones).
    DangerAcceptInvalid,
}

/// Settings shared by both transport bindings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── Transport ────────────────────────────────────────────────────────

/// The bound transport. Chosen once from the [`Endpoint`] and never swapped.
#[derive(Debug, Clone)]
pub enum Transport {
    Http { url: Url, http: reqwest::Client },
    UnixSocket { path: PathBuf, timeout: Duration },
}

impl Transport {
    /// Bind the transport matching `endpoint`.
    pub fn bind(endpoint: &Endpoint, config: &TransportConfig) -> Result<Self, Error> {
        match endpoint {
            Endpoint::Http(url) => Ok(Self::Http {
                url: url.clone(),
                http: config.build_client()?,
            }),
            Endpoint::UnixSocket(path) => Ok(Self::UnixSocket {
                path: path.clone(),
                timeout: config.timeout,
            }),
        }
    }

    /// POST a serialized envelope and return the raw response body.
    pub async fn send(&self, body: Vec<u8>) -> Result<Bytes, Error> {
        match self {
            Self::Http { url, http } => http_post(http, url, body).await,
            Self::UnixSocket { path, timeout } => socket_post(path, *timeout, body).await,
        }
    }
}

fn check_status(status: StatusCode, endpoint: impl Into<String>) -> Result<(), Error> {
    if status == StatusCode::OK {
        return Ok(());
    }
    Err(Error::HttpStatus {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_owned(),
        endpoint: endpoint.into(),
    })
}

async fn http_post(http: &reqwest::Client, url: &Url, body: Vec<u8>) -> Result<Bytes, Error> {
    debug!("POST {}", url);

    let resp = http
        .post(url.clone())
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(Error::Transport)?;

    check_status(resp.status(), url.as_str())?;
    resp.bytes().await.map_err(Error::Transport)
}

async fn socket_post(path: &Path, timeout: Duration, body: Vec<u8>) -> Result<Bytes, Error> {
    debug!(socket = %path.display(), "POST over unix socket");

    let stream = tokio::time::timeout(SOCKET_CONNECT_TIMEOUT, UnixStream::connect(path))
        .await
        .map_err(|_| Error::Timeout {
            timeout_ms: SOCKET_CONNECT_TIMEOUT.as_millis(),
        })?
        .map_err(|source| Error::Socket {
            path: path.to_path_buf(),
            source,
        })?;

    tokio::time::timeout(timeout, socket_exchange(stream, path, body))
        .await
        .map_err(|_| Error::Timeout {
            timeout_ms: timeout.as_millis(),
        })?
}

async fn socket_exchange(stream: UnixStream, path: &Path, body: Vec<u8>) -> Result<Bytes, Error> {
    let (mut sender, conn) = hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(
        stream,
    ))
    .await
    .map_err(|e| Error::Connection(format!("HTTP handshake failed: {e}")))?;

    // Drive the connection in the background
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            warn!(error = %e, "ubus socket connection error");
        }
    });

    let req = hyper::Request::builder()
        .method(hyper::Method::POST)
        .uri("/")
        .header(hyper::header::HOST, "localhost")
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .map_err(|e| Error::Connection(format!("failed to build request: {e}")))?;

    let resp = sender
        .send_request(req)
        .await
        .map_err(|e| Error::Connection(format!("request failed: {e}")))?;

    check_status(resp.status(), path.display().to_string())?;

    let bytes = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| Error::Connection(format!("failed to read response body: {e}")))?
        .to_bytes();
    Ok(bytes)
}
