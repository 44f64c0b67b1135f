//! UCI command handlers.

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;
use ubusly_api::{Client, UciChange, UciRequest, UciValues};

use crate::cli::{GlobalOpts, OutputFormat, UciArgs, UciCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Config")]
    name: String,
}

#[derive(Debug, PartialEq, Tabled)]
struct OptionRow {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Option")]
    option: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Serialize)]
struct ChangeEntry<'a> {
    config: &'a str,
    operation: &'a str,
    section: &'a str,
    option: Option<&'a str>,
    value: Option<&'a str>,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Config")]
    config: String,
    #[tabled(rename = "Op")]
    operation: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Option")]
    option: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&ChangeEntry<'_>> for ChangeRow {
    fn from(c: &ChangeEntry<'_>) -> Self {
        Self {
            config: c.config.to_owned(),
            operation: c.operation.to_owned(),
            section: c.section.to_owned(),
            option: c.option.unwrap_or_default().to_owned(),
            value: c.value.unwrap_or_default().to_owned(),
        }
    }
}

fn change_entry<'a>(config: &'a str, change: &'a UciChange) -> ChangeEntry<'a> {
    let field = move |i: usize| change.get(i).map(String::as_str);
    ChangeEntry {
        config,
        operation: field(0).unwrap_or_default(),
        section: field(1).unwrap_or_default(),
        option: field(2),
        value: field(3),
    }
}

// ── Value flattening ────────────────────────────────────────────────

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

/// One row per option. `.name`/`.type` and the other dot-prefixed keys
/// are UCI metadata and fold into the section columns.
fn section_rows(name: &str, section: &serde_json::Map<String, Value>) -> Vec<OptionRow> {
    let kind = section
        .get(".type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let name = section
        .get(".name")
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_owned();

    section
        .iter()
        .filter(|(key, _)| !key.starts_with('.'))
        .map(|(key, value)| OptionRow {
            section: name.clone(),
            kind: kind.clone(),
            option: key.clone(),
            value: scalar(value),
        })
        .collect()
}

/// Rows for whatever shape `uci.get` answered with: a single option value,
/// one section, or a map of sections.
fn option_rows(values: &UciValues) -> Vec<OptionRow> {
    if let Some(ref value) = values.value {
        return vec![OptionRow {
            section: String::new(),
            kind: String::new(),
            option: String::new(),
            value: scalar(value),
        }];
    }

    let Some(Value::Object(map)) = values.values.as_ref() else {
        return Vec::new();
    };

    if map.contains_key(".type") {
        return section_rows("", map);
    }

    map.iter()
        .filter_map(|(name, section)| section.as_object().map(|s| section_rows(name, s)))
        .flatten()
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    client: &mut Client,
    args: UciArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let painter = Painter::new(&global.color);

    match args.command {
        UciCommand::Configs => {
            let configs = client.uci_configs().await?;
            let out = output::render_list(
                &global.output,
                &configs,
                |c| ConfigRow { name: c.clone() },
                Clone::clone,
            )?;
            output::print_output(&out, global.quiet);
        }

        UciCommand::Get {
            config,
            section,
            option,
            r#type,
        } => {
            let mut request = UciRequest::config(config);
            if let Some(section) = section {
                request = request.section(section);
            }
            if let Some(option) = option {
                request = request.option(option);
            }
            if let Some(kind) = r#type {
                request = request.kind(kind);
            }

            let values = client.uci_get(&request).await?;
            let out = output::render_single(
                &global.output,
                &values,
                |v| {
                    if v.value.is_some() {
                        option_rows(v)
                            .into_iter()
                            .map(|r| r.value)
                            .collect::<Vec<_>>()
                            .join("\n")
                    } else {
                        output::render_table(&option_rows(v))
                    }
                },
                |v| {
                    option_rows(v)
                        .into_iter()
                        .map(|r| {
                            if r.option.is_empty() {
                                r.value
                            } else {
                                format!("{}.{}={}", r.section, r.option, r.value)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
        }

        UciCommand::Set {
            config,
            section,
            values,
        } => {
            let mut request = UciRequest::config(config.clone()).section(section.clone());
            for (key, value) in values {
                request = request.value(key, value);
            }
            client.uci_set(&request).await?;
            if !global.quiet {
                eprintln!(
                    "{} {config}.{section} (run `ubusly uci commit {config}` to apply)",
                    painter.good("✓ staged")
                );
            }
        }

        UciCommand::Changes { config } => {
            let changes = client.uci_changes(config.as_deref()).await?;
            let fallback = config.as_deref().unwrap_or_default();
            let entries: Vec<ChangeEntry<'_>> = changes
                .entries()
                .map(|(name, change)| change_entry(name.unwrap_or(fallback), change))
                .collect();

            if entries.is_empty() && matches!(global.output, OutputFormat::Table) {
                if !global.quiet {
                    eprintln!("{}", painter.dim("No uncommitted changes"));
                }
                return Ok(());
            }

            let out = output::render_list(
                &global.output,
                &entries,
                |c| ChangeRow::from(c),
                |c| {
                    let mut line = format!("{} {}.{}", c.operation, c.config, c.section);
                    if let Some(option) = c.option {
                        line.push('.');
                        line.push_str(option);
                    }
                    if let Some(value) = c.value {
                        line.push('=');
                        line.push_str(value);
                    }
                    line
                },
            )?;
            output::print_output(&out, global.quiet);
        }

        UciCommand::Commit { config, reload } => {
            client.uci_commit(&config).await?;
            if reload {
                client.uci_reload_config().await?;
            }
            if !global.quiet {
                let suffix = if reload { " and reloaded services" } else { "" };
                eprintln!("{} {config}{suffix}", painter.good("✓ committed"));
            }
        }

        UciCommand::Reload => {
            client.uci_reload_config().await?;
            if !global.quiet {
                eprintln!("{}", painter.good("✓ reload triggered"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn values(v: serde_json::Value) -> UciValues {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn single_option_value() {
        let rows = option_rows(&values(json!({"value": "static"})));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "static");
    }

    #[test]
    fn list_option_joins_items() {
        let rows = option_rows(&values(json!({"value": ["8.8.8.8", "1.1.1.1"]})));
        assert_eq!(rows[0].value, "8.8.8.8 1.1.1.1");
    }

    #[test]
    fn single_section_skips_metadata() {
        let rows = option_rows(&values(json!({
            "values": {".name": "lan", ".type": "interface", ".anonymous": false, "proto": "static"}
        })));
        assert_eq!(
            rows,
            vec![OptionRow {
                section: "lan".into(),
                kind: "interface".into(),
                option: "proto".into(),
                value: "static".into(),
            }]
        );
    }

    #[test]
    fn whole_config_flattens_sections() {
        let rows = option_rows(&values(json!({
            "values": {
                "lan": {".type": "interface", "proto": "static", "ipaddr": "192.168.1.1"},
                "wan": {".type": "interface", "proto": "dhcp"}
            }
        })));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.kind == "interface"));
        assert!(rows.iter().any(|r| r.section == "wan" && r.value == "dhcp"));
    }

    #[test]
    fn change_entries_tolerate_short_tuples() {
        let change: UciChange = vec!["add".into(), "cfg0a1b2c".into()];
        let entry = change_entry("firewall", &change);
        assert_eq!(entry.operation, "add");
        assert_eq!(entry.section, "cfg0a1b2c");
        assert!(entry.option.is_none());
    }
}
