//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};
use std::path::Path;

use chrono::{DateTime, Local};
use ubusly_api::Args;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, the operation is refused instead.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Build call arguments from an inline JSON string or a file. Neither
/// means an empty object.
pub fn call_args(inline: Option<&str>, file: Option<&Path>) -> Result<Args, CliError> {
    let value = match (inline, file) {
        (_, Some(path)) => read_json_file(path)?,
        (Some(raw), None) => serde_json::from_str(raw).map_err(|e| CliError::Validation {
            field: "args".into(),
            reason: format!("invalid JSON: {e}"),
        })?,
        (None, None) => return Ok(Args::new()),
    };

    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(CliError::Validation {
            field: "args".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// Slurp stdin for commands that accept piped data.
pub fn read_stdin() -> Result<String, CliError> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Local wall-clock rendering of a unix timestamp in seconds.
pub fn format_unix(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0).map_or_else(
        || secs.to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Same as [`format_unix`] for millisecond timestamps.
pub fn format_unix_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// `-` for absent values in table cells.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}
