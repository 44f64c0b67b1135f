use std::path::PathBuf;

use thiserror::Error;

use crate::status::UbusStatus;

/// Where to read about granting a session access to an object.
pub const ACL_HELP_URL: &str = "https://openwrt.org/docs/techref/ubus#acls";

/// Top-level error type for the `ubusly-api` crate.
///
/// Covers every failure mode of a ubus round trip: the local session guard,
/// the transport, the JSON-RPC envelope and the classified ubus status.
/// Nothing in this crate retries; every variant reaches the caller once.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// A protected operation was attempted before a successful login.
    #[error("Not logged in -- call login() first")]
    NotLoggedIn,

    /// The session's ACL does not grant the requested object/method, or the
    /// session has expired server-side.
    #[error(
        "Access denied for {object}.{method}: the session ACL does not grant it \
         (see {url}), or the session has expired",
        url = ACL_HELP_URL
    )]
    PermissionDenied {
        object: String,
        method: String,
        payload: serde_json::Value,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a status other than 200.
    #[error("HTTP {status} {reason} from {endpoint}")]
    HttpStatus {
        status: u16,
        reason: String,
        endpoint: String,
    },

    /// Could not reach the local ubus socket.
    #[error("failed to connect to ubus socket at {}: {source}", .path.display())]
    Socket {
        path: PathBuf,
        source: std::io::Error,
    },

    /// HTTP exchange over the unix socket failed after connecting.
    #[error("ubus socket request failed: {0}")]
    Connection(String),

    /// The transport deadline elapsed.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u128 },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No transport exists for this endpoint scheme.
    #[error("unsupported endpoint scheme '{0}' (expected http, https or a socket path)")]
    UnsupportedTransport(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The response envelope or its payload could not be decoded.
    #[error("Malformed ubus response: {message}")]
    Decode { message: String, body: String },

    /// The response id does not echo the request id.
    #[error("response id mismatch: sent {sent}, received {received:?}")]
    IdMismatch { sent: u64, received: Option<u64> },

    /// JSON-RPC level failure reported in the `error` member with no `result`.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    // ── ubus status ─────────────────────────────────────────────────
    /// The remote object returned a non-zero ubus status.
    #[error("{object}.{method} failed: {status}")]
    Status {
        status: UbusStatus,
        object: String,
        method: String,
        payload: serde_json::Value,
    },

    /// The object is not registered, most likely because its rpcd plugin is
    /// not installed on the router.
    #[error(
        "{object} module not found, try 'opkg update && opkg install {package} \
         && service rpcd restart'"
    )]
    MissingModule {
        object: String,
        package: &'static str,
        status: UbusStatus,
    },
}

impl Error {
    /// The ubus status behind this error, if it came from the remote object.
    ///
    /// Preserved through peripheral wrapping (e.g. [`Error::MissingModule`])
    /// so callers can match on the original code.
    pub fn status(&self) -> Option<UbusStatus> {
        match self {
            Self::Status { status, .. } | Self::MissingModule { status, .. } => Some(*status),
            Self::PermissionDenied { .. } => Some(UbusStatus::PermissionDenied),
            _ => None,
        }
    }

    /// The payload that accompanied a failed status, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { payload, .. } | Self::PermissionDenied { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Returns `true` if the session lacks access (or has expired).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Returns `true` if the error arose before any byte reached the router
    /// or while waiting on it, i.e. the caller may reasonably try again.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Socket { .. } => true,
            Self::Status { status, .. } => {
                matches!(status, UbusStatus::Timeout | UbusStatus::ConnectionFailed)
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.status(),
            Some(UbusStatus::NotFound | UbusStatus::MethodNotFound)
        ) || matches!(self, Self::HttpStatus { status: 404, .. })
    }

    /// Rewrap a `NotFound` status as a [`Error::MissingModule`] carrying an
    /// install hint for the rpcd plugin that provides `object`.
    pub(crate) fn with_module_hint(self, package: &'static str) -> Self {
        match self {
            Self::Status {
                status: status @ UbusStatus::NotFound,
                object,
                ..
            } => Self::MissingModule {
                object,
                package,
                status,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn status_error(status: UbusStatus) -> Error {
        Error::Status {
            status,
            object: "file".into(),
            method: "read".into(),
            payload: json!({}),
        }
    }

    #[test]
    fn module_hint_preserves_code() {
        let err = status_error(UbusStatus::NotFound).with_module_hint("rpcd-mod-file");
        assert!(matches!(err, Error::MissingModule { .. }));
        assert_eq!(err.status(), Some(UbusStatus::NotFound));
        assert!(err.to_string().contains("opkg install rpcd-mod-file"));
    }

    #[test]
    fn module_hint_ignores_other_statuses() {
        let err = status_error(UbusStatus::InvalidArgument).with_module_hint("rpcd-mod-file");
        assert_eq!(err.status(), Some(UbusStatus::InvalidArgument));
        assert!(err.payload().is_some());
    }

    #[test]
    fn permission_denied_mentions_acls() {
        let err = Error::PermissionDenied {
            object: "uci".into(),
            method: "set".into(),
            payload: json!({}),
        };
        assert!(err.is_permission_denied());
        assert_eq!(err.status(), Some(UbusStatus::PermissionDenied));
        assert!(err.to_string().contains(ACL_HELP_URL));
    }

    #[test]
    fn id_mismatch_shows_both_ids() {
        let err = Error::IdMismatch {
            sent: 3,
            received: Some(4),
        };
        assert_eq!(err.to_string(), "response id mismatch: sent 3, received Some(4)");
    }
}
