//! CLI error types with miette diagnostics.
//!
//! Maps `ubusly_api::Error` and `ConfigError` variants into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ubusly_api::{Error as ApiError, UbusStatus};
use ubusly_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach ubus at {endpoint}")]
    #[diagnostic(
        code(ubusly::connection_failed),
        help(
            "Check that uhttpd (for HTTP) or rpcd (for the socket) is running.\n\
             Endpoint: {endpoint}\n\
             Try: ubusly --endpoint https://192.168.1.1/ubus session show"
        )
    )]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(ubusly::tls_error),
        help(
            "Routers usually serve self-signed certificates.\n\
             Use --insecure (-k) to accept them, or configure ca_cert in your profile."
        )
    )]
    TlsError { message: String },

    #[error("Request timed out ({detail})")]
    #[diagnostic(
        code(ubusly::timeout),
        help("Increase timeout with --timeout; wireless scans often need 10s or more.")
    )]
    Timeout { detail: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Login failed for user '{username}'")]
    #[diagnostic(
        code(ubusly::auth_failed),
        help(
            "Verify the rpcd credentials (usually the router's root password).\n\
             Run: ubusly config set-password {profile}"
        )
    )]
    AuthFailed { username: String, profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(ubusly::no_credentials),
        help(
            "Configure credentials with: ubusly config init\n\
             Or set the UBUSLY_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Access denied for {object}.{method}")]
    #[diagnostic(
        code(ubusly::permission_denied),
        help(
            "The session's ACL does not grant this call, or the session expired.\n\
             Grant it in /usr/share/rpcd/acl.d/ on the router.\n\
             See: https://openwrt.org/docs/techref/ubus#acls"
        )
    )]
    PermissionDenied { object: String, method: String },

    // ── ubus ─────────────────────────────────────────────────────────

    #[error("{object}.{method}: {status}")]
    #[diagnostic(
        code(ubusly::not_found),
        help("Run: ubusly list {object} to see what the bus exposes")
    )]
    NotFound {
        object: String,
        method: String,
        status: UbusStatus,
    },

    #[error("The '{object}' object is not available on this router")]
    #[diagnostic(
        code(ubusly::missing_module),
        help("Install it with: opkg update && opkg install {package} && service rpcd restart")
    )]
    MissingModule { object: String, package: String },

    #[error("{object}.{method} failed: {status}")]
    #[diagnostic(code(ubusly::status))]
    Status {
        object: String,
        method: String,
        status: UbusStatus,
    },

    #[error("Protocol error: {message}")]
    #[diagnostic(
        code(ubusly::protocol),
        help("The endpoint did not answer like rpcd. Check that the URL ends in /ubus.")
    )]
    Protocol { message: String },

    #[error("{command} exited with status {code}")]
    #[diagnostic(code(ubusly::exec_failed))]
    ExecFailed { command: String, code: i32 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ubusly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ubusly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ubusly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(ubusly::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(ubusly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(ubusly::json), help("Check the JSON arguments and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(ubusly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::MissingModule { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

// ── ubusly_api::Error → CliError mapping ─────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotLoggedIn => Self::NoCredentials {
                profile: "current".into(),
            },

            ApiError::PermissionDenied { object, method, .. } => {
                Self::PermissionDenied { object, method }
            }

            ApiError::Transport(e) if e.is_timeout() => Self::Timeout {
                detail: "no HTTP response from the router".into(),
            },

            ApiError::Transport(e) => Self::ConnectionFailed {
                endpoint: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },

            ApiError::HttpStatus {
                status,
                reason,
                endpoint,
            } => Self::ConnectionFailed {
                endpoint,
                source: format!("HTTP {status} {reason}").into(),
            },

            ApiError::Socket { path, source } => Self::ConnectionFailed {
                endpoint: path.display().to_string(),
                source: Box::new(source),
            },

            ApiError::Connection(message) => Self::ConnectionFailed {
                endpoint: "(socket)".into(),
                source: message.into(),
            },

            ApiError::Timeout { timeout_ms } => Self::Timeout {
                detail: format!("after {timeout_ms}ms"),
            },

            ApiError::InvalidUrl(e) => Self::Validation {
                field: "endpoint".into(),
                reason: e.to_string(),
            },

            ApiError::UnsupportedTransport(scheme) => Self::Validation {
                field: "endpoint".into(),
                reason: format!("unsupported scheme '{scheme}'"),
            },

            ApiError::Tls(message) => Self::TlsError { message },

            ApiError::MissingModule {
                object, package, ..
            } => Self::MissingModule {
                object,
                package: package.into(),
            },

            ApiError::Status {
                status: status @ (UbusStatus::NotFound | UbusStatus::MethodNotFound),
                object,
                method,
                ..
            } => Self::NotFound {
                object,
                method,
                status,
            },

            ApiError::Status {
                status: UbusStatus::Timeout,
                ..
            } => Self::Timeout {
                detail: "the router reported a ubus timeout".into(),
            },

            ApiError::Status {
                status,
                object,
                method,
                ..
            } => Self::Status {
                object,
                method,
                status,
            },

            e @ (ApiError::Decode { .. } | ApiError::IdMismatch { .. } | ApiError::Rpc { .. }) => {
                Self::Protocol {
                    message: e.to_string(),
                }
            }
        }
    }
}
