//! CLI configuration -- thin wrapper around `ubusly_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--endpoint, --username, etc.).

use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ubusly_config::{
    Config, ConnectionConfig, Defaults, Profile, config_path, load_config, save_config,
    store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Resolve the connection for this invocation.
///
/// Flag overrides take priority over profile values. Without any config
/// the CLI targets the local rpcd socket, so it works on the router itself;
/// an explicitly requested profile must exist.
pub fn resolve_connection(global: &GlobalOpts) -> Result<(ConnectionConfig, String), CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let fallback = Profile::default();
    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => &fallback,
    };

    let merged = Profile {
        endpoint: global
            .endpoint
            .clone()
            .unwrap_or_else(|| profile.endpoint.clone()),
        username: global.username.clone().or_else(|| profile.username.clone()),
        password: profile.password.clone(),
        password_env: profile.password_env.clone(),
        ca_cert: profile.ca_cert.clone(),
        insecure: if global.insecure {
            Some(true)
        } else {
            profile.insecure
        },
        timeout: global.timeout.or(profile.timeout),
    };

    let mut conn = ubusly_config::profile_to_connection(&merged, &profile_name, &cfg.defaults)?;

    // --password beats the whole credential chain
    if let Some(ref password) = global.password {
        conn.password = Some(SecretString::from(password.clone()));
    }

    Ok((conn, profile_name))
}
