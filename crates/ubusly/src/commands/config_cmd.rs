//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use ubusly_config::ConfigError;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output::{self, Painter};

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> Result<String, CliError> {
    let text = toml::to_string_pretty(&redacted(cfg)).map_err(ConfigError::from)?;
    Ok(text.trim_end().to_owned())
}

/// Structured views get the same masking as the TOML view.
fn redacted(cfg: &Config) -> Config {
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: config::Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            insecure: cfg.defaults.insecure,
            timeout: cfg.defaults.timeout,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                (
                    name.clone(),
                    Profile {
                        endpoint: p.endpoint.clone(),
                        username: p.username.clone(),
                        password: p.password.as_ref().map(|_| "****".into()),
                        password_env: p.password_env.clone(),
                        ca_cert: p.ca_cert.clone(),
                        insecure: p.insecure,
                        timeout: p.timeout,
                    },
                )
            })
            .collect(),
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available_profiles(cfg),
    }
}

/// Offer to store the password in the system keyring or return it for
/// plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    profile_name: &str,
    painter: Painter,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, secret)?;
        eprintln!("   {} password stored in system keyring", painter.good("✓"));
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

/// Apply `config set <key> <value>` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "endpoint" => {
            // reject what the connection layer would reject later
            ubusly_api::Endpoint::parse(&value).map_err(|e| CliError::Validation {
                field: "endpoint".into(),
                reason: e.to_string(),
            })?;
            profile.endpoint = value;
        }
        "username" => profile.username = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "insecure" => profile.insecure = Some(parse_bool("insecure", &value)?),
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: endpoint, username, \
                     password_env, insecure, timeout, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let painter = Painter::new(&global.color);

    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            let mut cfg = config::load_config()?;
            eprintln!("{}", painter.accent("ubusly configuration wizard"));
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Endpoint
            let endpoint: String = Input::new()
                .with_prompt("ubus endpoint (URL or socket path, empty for local socket)")
                .default("https://192.168.1.1/ubus".into())
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            ubusly_api::Endpoint::parse(&endpoint).map_err(|e| CliError::Validation {
                field: "endpoint".into(),
                reason: e.to_string(),
            })?;

            // 3. Credentials; an empty password keeps the profile anonymous
            let username: String = Input::new()
                .with_prompt("Username")
                .default("root".into())
                .interact_text()
                .map_err(prompt_err)?;

            let pass = rpassword::prompt_password("Password (empty for anonymous): ")
                .map_err(prompt_err)?;
            let password = if pass.is_empty() {
                None
            } else {
                prompt_keyring_storage(&pass, &profile_name, painter)?
            };

            // 4. TLS
            let insecure = if endpoint.starts_with("https://") {
                Some(
                    Confirm::new()
                        .with_prompt("Accept self-signed certificates?")
                        .default(true)
                        .interact()
                        .map_err(prompt_err)?,
                )
            } else {
                None
            };

            // 5. Merge into the existing config
            let profile = Profile {
                endpoint,
                username: Some(username),
                password,
                insecure,
                ..Profile::default()
            };

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            // 6. Write config
            let path = config::save_config(&cfg)?;

            eprintln!(
                "\n{} Configuration written to {}",
                painter.good("✓"),
                path.display()
            );
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: ubusly session show");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let text = format_config_redacted(&cfg)?;
            let out = output::render_single(
                &global.output,
                &redacted(&cfg),
                |_| text.clone(),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!(
                "{} Set {key} on profile '{profile_name}'",
                painter.good("✓")
            );
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: ubusly config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if name == default { " *" } else { "" };
                    let endpoint = if profile.endpoint.is_empty() {
                        ubusly_api::DEFAULT_SOCKET_PATH
                    } else {
                        profile.endpoint.as_str()
                    };
                    println!("{name}{marker}\t{}", painter.dim(endpoint));
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("{} Default profile set to '{name}'", painter.good("✓"));
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { name } => {
            let cfg = config::load_config()?;
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_password(&profile_name, &secret)?;

            eprintln!(
                "{} Password stored in system keyring for profile '{profile_name}'",
                painter.good("✓")
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                endpoint: "https://192.168.1.1/ubus".into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn show_masks_plaintext_password() {
        let text = format_config_redacted(&sample()).unwrap();
        assert!(text.contains("[profiles.home]"));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));

        let json = serde_json::to_string(&redacted(&sample())).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn show_output_parses_back_with_awkward_names() {
        let mut cfg = sample();
        cfg.profiles.insert(
            "lab.east".into(),
            Profile {
                endpoint: "https://10.0.0.1/ubus".into(),
                username: Some("say \"hi\"".into()),
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.profiles["lab.east"].username.as_deref(), Some("say \"hi\""));
        assert_eq!(parsed.profiles["home"].password.as_deref(), Some("****"));
    }

    #[test]
    fn set_known_keys() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "endpoint", "/tmp/ubus.sock".into()).unwrap();
        set_profile_key(&mut profile, "insecure", "false".into()).unwrap();
        set_profile_key(&mut profile, "timeout", "10".into()).unwrap();
        set_profile_key(&mut profile, "password-env", "ROUTER_PW".into()).unwrap();
        assert_eq!(profile.endpoint, "/tmp/ubus.sock");
        assert_eq!(profile.insecure, Some(false));
        assert_eq!(profile.timeout, Some(10));
        assert_eq!(profile.password_env.as_deref(), Some("ROUTER_PW"));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "timeout", "soon".into()).is_err());
        assert!(set_profile_key(&mut profile, "endpoint", "ftp://router".into()).is_err());
        let err = set_profile_key(&mut profile, "site", "x".into()).unwrap_err();
        assert!(err.to_string().contains("site"));
    }
}
