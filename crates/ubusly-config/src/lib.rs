//! Configuration for the ubusly CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to a ready-to-connect [`ConnectionConfig`]. The CLI adds
//! flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use ubusly_api::{Client, Endpoint, TlsMode, TransportConfig};

/// Keyring service name under which profile passwords are stored.
pub const KEYRING_SERVICE: &str = "ubusly";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "UBUSLY_CONFIG";

/// Password fallback consulted after a profile's own `password_env`.
pub const PASSWORD_ENV: &str = "UBUSLY_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Accept self-signed router certificates unless a profile says otherwise.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: default_insecure(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    ubusly_api::DEFAULT_TIMEOUT.as_secs()
}

/// A named router profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// `https://192.168.1.1/ubus`, a socket path, or empty for the local
    /// rpcd socket.
    #[serde(default)]
    pub endpoint: String,

    /// Login user; `root` when unset.
    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

impl Profile {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("root")
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$UBUSLY_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "ubusly", "ubusly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("ubusly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults; a file
/// that fails to parse is an error, never silently replaced.
///
/// Environment keys nest on a double underscore, e.g.
/// `UBUSLY_DEFAULTS__TIMEOUT=10` or `UBUSLY_PROFILES__LAB__ENDPOINT=...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UBUSLY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the login password for a profile.
///
/// Chain: the profile's `password_env` variable, `UBUSLY_PASSWORD`, the
/// system keyring (`ubusly` / `<profile>/password`), then plaintext.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Global env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

// ── Connection ──────────────────────────────────────────────────────

/// Everything needed to open a logged-in [`Client`].
#[derive(Debug)]
pub struct ConnectionConfig {
    pub endpoint: Endpoint,
    pub transport: TransportConfig,
    pub username: String,
    /// `None` keeps the client on the anonymous session.
    pub password: Option<SecretString>,
}

impl ConnectionConfig {
    /// Build the client without contacting the router.
    pub fn client(&self) -> Result<Client, ubusly_api::Error> {
        Client::from_endpoint(self.endpoint.clone(), &self.transport)
    }

    /// Build the client and log in when a password is available.
    pub async fn connect(&self) -> Result<Client, ubusly_api::Error> {
        let mut client = self.client()?;
        if let Some(ref password) = self.password {
            client.login(&self.username, password).await?;
        }
        Ok(client)
    }
}

/// TLS mode for a profile: a CA file wins, then the insecure switch.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    }
}

/// Build a `ConnectionConfig` from a profile, no CLI flag overrides.
///
/// A profile without any resolvable password connects anonymously.
pub fn profile_to_connection(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    let endpoint = Endpoint::parse(&profile.endpoint).map_err(|e| ConfigError::Validation {
        field: "endpoint".into(),
        reason: e.to_string(),
    })?;

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ConnectionConfig {
        endpoint,
        transport: TransportConfig {
            tls: tls_mode(profile, defaults),
            timeout,
        },
        username: profile.username().to_owned(),
        password: resolve_password(profile, profile_name).ok(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("default"));
            assert_eq!(cfg.defaults.timeout, 3);
            assert!(cfg.defaults.insecure);
            assert!(cfg.profiles.is_empty());
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [defaults]
                timeout = "oops"
                "#,
            )?;
            let err = load_config_from(&jail.directory().join("config.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Figment(_)));
            Ok(())
        });
    }

    #[test]
    fn file_and_env_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "lab"

                [profiles.lab]
                endpoint = "https://10.0.0.1/ubus"
                username = "admin"
                "#,
            )?;
            jail.set_env("UBUSLY_DEFAULTS__TIMEOUT", "10");

            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
            assert_eq!(cfg.defaults.timeout, 10);
            assert_eq!(cfg.profiles["lab"].endpoint, "https://10.0.0.1/ubus");
            assert_eq!(cfg.profiles["lab"].username(), "admin");
            Ok(())
        });
    }

    #[test]
    fn password_env_wins_over_plaintext() {
        Jail::expect_with(|jail| {
            jail.set_env("LAB_ROUTER_PW", "from-env");
            let profile = Profile {
                password_env: Some("LAB_ROUTER_PW".into()),
                password: Some("plain".into()),
                ..Profile::default()
            };
            let pw = resolve_password(&profile, "lab").unwrap();
            assert_eq!(pw.expose_secret(), "from-env");
            Ok(())
        });
    }

    #[test]
    fn global_password_env_is_second() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "global");
            let profile = Profile {
                password_env: Some("UNSET_VARIABLE_FOR_TEST".into()),
                password: Some("plain".into()),
                ..Profile::default()
            };
            let pw = resolve_password(&profile, "lab").unwrap();
            assert_eq!(pw.expose_secret(), "global");
            Ok(())
        });
    }

    #[test]
    fn profile_translates_to_connection() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "pw");
            let profile = Profile {
                endpoint: "https://192.168.1.1/ubus".into(),
                timeout: Some(7),
                insecure: Some(false),
                ..Profile::default()
            };
            let conn = profile_to_connection(&profile, "default", &Defaults::default()).unwrap();
            assert!(matches!(conn.endpoint, Endpoint::Http(_)));
            assert_eq!(conn.transport.timeout, Duration::from_secs(7));
            assert!(matches!(conn.transport.tls, TlsMode::System));
            assert_eq!(conn.username, "root");
            assert!(conn.password.is_some());
            Ok(())
        });
    }

    #[test]
    fn empty_endpoint_is_local_socket() {
        let conn =
            profile_to_connection(&Profile::default(), "local", &Defaults::default()).unwrap();
        assert_eq!(conn.endpoint, Endpoint::default());
        assert!(matches!(conn.transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn bad_endpoint_scheme_is_validation_error() {
        let profile = Profile {
            endpoint: "ftp://router/ubus".into(),
            ..Profile::default()
        };
        let err = profile_to_connection(&profile, "x", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "endpoint"));
    }

    #[test]
    fn ca_cert_takes_precedence() {
        let profile = Profile {
            ca_cert: Some("/etc/ssl/router.pem".into()),
            insecure: Some(true),
            ..Profile::default()
        };
        assert!(matches!(
            tls_mode(&profile, &Defaults::default()),
            TlsMode::CustomCa(_)
        ));
    }

    #[test]
    fn save_then_load() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested/config.toml");
            let mut cfg = Config::default();
            cfg.profiles.insert(
                "home".into(),
                Profile {
                    endpoint: "http://192.168.1.1/ubus".into(),
                    ..Profile::default()
                },
            );
            save_config_to(&cfg, &path).unwrap();

            let loaded = load_config_from(&path).unwrap();
            assert_eq!(loaded.profiles["home"].endpoint, "http://192.168.1.1/ubus");
            Ok(())
        });
    }
}
