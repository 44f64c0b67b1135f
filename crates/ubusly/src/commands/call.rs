//! Generic `call` and `list` handlers.

use serde_json::Value;
use tabled::Tabled;
use ubusly_api::{Args, Client};

use crate::cli::{CallArgs, GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SignatureRow {
    #[tabled(rename = "Object")]
    object: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Arguments")]
    arguments: String,
}

/// Flatten `{object: {method: {arg: type}}}` into one row per method.
fn signature_rows(listing: &Value) -> Vec<SignatureRow> {
    let Some(objects) = listing.as_object() else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for (object, methods) in objects {
        let Some(methods) = methods.as_object() else {
            continue;
        };
        if methods.is_empty() {
            rows.push(SignatureRow {
                object: object.clone(),
                method: String::new(),
                arguments: String::new(),
            });
        }
        for (method, signature) in methods {
            let arguments = signature
                .as_object()
                .map(|args| {
                    args.iter()
                        .map(|(name, kind)| match kind {
                            Value::String(s) => format!("{name}:{s}"),
                            other => format!("{name}:{other}"),
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            rows.push(SignatureRow {
                object: object.clone(),
                method: method.clone(),
                arguments,
            });
        }
    }
    rows
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_call(
    client: &mut Client,
    args: CallArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let call_args = util::call_args(args.args.as_deref(), args.from_file.as_deref())?;
    let payload = client.call(&args.object, &args.method, &call_args).await?;
    let out = output::render_value(&global.output, &payload)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_list(
    client: &mut Client,
    args: ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let listing = client
        .list(&args.object, &args.method, &Args::new())
        .await?;
    let out = output::render_single(
        &global.output,
        &listing,
        |v| output::render_table(&signature_rows(v)),
        |v| {
            v.as_object()
                .map(|objects| objects.keys().cloned().collect::<Vec<_>>().join("\n"))
                .unwrap_or_default()
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn signatures_flatten_per_method() {
        let rows = signature_rows(&json!({
            "network.interface.lan": {
                "up": {},
                "status": {},
                "notify_proto": { "action": "Integer" }
            },
            "empty.object": {}
        }));
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].object, "empty.object");
        assert_eq!(rows[0].method, "");
        let notify = rows.iter().find(|r| r.method == "notify_proto");
        assert_eq!(
            notify.map(|r| r.arguments.as_str()),
            Some("action:Integer")
        );
    }

    #[test]
    fn non_object_listing_has_no_rows() {
        assert!(signature_rows(&json!([1, 2])).is_empty());
    }
}
