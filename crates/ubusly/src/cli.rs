//! Clap derive structures for the `ubusly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ubusly -- talk to OpenWrt's ubus from the command line
#[derive(Debug, Parser)]
#[command(
    name = "ubusly",
    version,
    about = "Call OpenWrt ubus objects from the command line",
    long_about = "A CLI for the ubus JSON-RPC interface of OpenWrt routers.\n\n\
        Connects over HTTP(S) to uhttpd's /ubus handler or directly to the\n\
        local rpcd socket, logs in with rpcd session credentials and calls\n\
        any object the session's ACL grants.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "UBUSLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// ubus endpoint: https://router/ubus, a socket path, or "" for the
    /// local rpcd socket (overrides profile)
    #[arg(long, short = 'e', env = "UBUSLY_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// rpcd login user (overrides profile)
    #[arg(long, short = 'u', env = "UBUSLY_USERNAME", global = true)]
    pub username: Option<String>,

    /// rpcd login password (prefer the keyring or UBUSLY_PASSWORD)
    #[arg(long, global = true, hide = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "UBUSLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "UBUSLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: profile, then 3)
    #[arg(long, env = "UBUSLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Call a method on any ubus object
    Call(CallArgs),

    /// List objects and method signatures
    #[command(alias = "ls")]
    List(ListArgs),

    /// Inspect the rpcd session
    Session(SessionArgs),

    /// Files on the router (rpcd-mod-file)
    File(FileArgs),

    /// System log
    Log(LogArgs),

    /// UCI configuration
    Uci(UciArgs),

    /// Wireless radios (rpcd-mod-iwinfo)
    #[command(alias = "wifi", alias = "iw")]
    Wireless(WirelessArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALL / LIST
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Object path, e.g. "system" or "network.interface.lan"
    pub object: String,

    /// Method name
    pub method: String,

    /// Arguments as a JSON object
    #[arg(conflicts_with = "from_file")]
    pub args: Option<String>,

    /// Read the arguments object from a JSON file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Object path or pattern
    #[arg(default_value = "*")]
    pub object: String,

    /// Restrict to one method
    #[arg(default_value = "")]
    pub method: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Log in and show the session's timeout and user data
    Show,

    /// Show the ubus ACL granted to the session
    Acls,

    /// Check whether the session may call object.method
    Check {
        /// Object path
        object: String,
        /// Method name
        method: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FILE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FileArgs {
    #[command(subcommand)]
    pub command: FileCommand,
}

#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// List a directory
    #[command(alias = "ls")]
    List {
        /// Directory path
        #[arg(default_value = "/")]
        path: String,
    },

    /// Show file metadata
    Stat {
        /// File path
        path: String,
    },

    /// Print a file's contents
    #[command(alias = "cat")]
    Read {
        /// File path
        path: String,
    },

    /// Write a file (data from --data or stdin)
    Write {
        /// File path
        path: String,

        /// Contents to write; stdin is read when omitted
        #[arg(long, short = 'd')]
        data: Option<String>,

        /// Append instead of truncating
        #[arg(long, short = 'a')]
        append: bool,

        /// File mode, octal (e.g. 644)
        #[arg(long, short = 'm', value_parser = parse_octal_mode)]
        mode: Option<u32>,

        /// Data is base64 encoded
        #[arg(long)]
        base64: bool,
    },

    /// Run a command on the router
    Exec {
        /// Absolute path of the command
        command: String,

        /// Command arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        params: Vec<String>,
    },
}

fn parse_octal_mode(raw: &str) -> Result<u32, String> {
    let digits = raw.trim_start_matches("0o");
    u32::from_str_radix(digits, 8).map_err(|e| format!("'{raw}' is not an octal mode: {e}"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommand,
}

#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// Read recent log lines
    Read {
        /// Number of lines
        #[arg(long, short = 'n', default_value = "100")]
        lines: u32,
    },

    /// Write a message to the system log
    Write {
        /// Message text
        message: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  UCI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UciArgs {
    #[command(subcommand)]
    pub command: UciCommand,
}

#[derive(Debug, Subcommand)]
pub enum UciCommand {
    /// List config names
    Configs,

    /// Read a config, section or option
    Get {
        /// Config name, e.g. "network"
        config: String,
        /// Section name
        section: Option<String>,
        /// Option name
        option: Option<String>,
        /// Select sections by type instead of name
        #[arg(long, short = 't', conflicts_with = "section")]
        r#type: Option<String>,
    },

    /// Stage option values on a section
    Set {
        /// Config name
        config: String,
        /// Section name
        section: String,
        /// Values as key=value
        #[arg(required = true, value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },

    /// Show staged, uncommitted changes
    Changes {
        /// Restrict to one config
        config: Option<String>,
    },

    /// Commit staged changes of a config
    Commit {
        /// Config name
        config: String,
        /// Reload affected services afterwards
        #[arg(long, short = 'r')]
        reload: bool,
    },

    /// Reload services whose configuration changed
    Reload,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WIRELESS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WirelessArgs {
    #[command(subcommand)]
    pub command: WirelessCommand,
}

#[derive(Debug, Subcommand)]
pub enum WirelessCommand {
    /// List wireless interfaces
    Devices,

    /// Show radio status
    Info {
        /// Interface name, e.g. wlan0
        device: String,
    },

    /// Scan for nearby networks
    Scan {
        /// Interface name
        device: String,
    },

    /// List associated stations
    #[command(alias = "assoc")]
    Stations {
        /// Interface name
        device: String,
        /// Only this station
        #[arg(long)]
        mac: Option<String>,
    },

    /// List supported channels
    #[command(alias = "freqlist")]
    Channels {
        /// Interface name
        device: String,
    },

    /// List supported transmit power levels
    #[command(alias = "txpowerlist")]
    Txpower {
        /// Interface name
        device: String,
    },

    /// List regulatory country codes
    #[command(alias = "countrylist")]
    Countries {
        /// Interface name
        device: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key: endpoint, username, password_env, insecure, timeout, ca_cert
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name (default: active profile)
        name: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn octal_modes() {
        assert_eq!(parse_octal_mode("644").unwrap(), 0o644);
        assert_eq!(parse_octal_mode("0o755").unwrap(), 0o755);
        assert!(parse_octal_mode("9").is_err());
    }

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_value("proto=static").unwrap(),
            ("proto".into(), "static".into())
        );
        assert_eq!(
            parse_key_value("ipaddr=").unwrap(),
            ("ipaddr".into(), String::new())
        );
        assert!(parse_key_value("=x").is_err());
        assert!(parse_key_value("novalue").is_err());
    }
}
