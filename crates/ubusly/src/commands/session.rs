//! Session inspection handlers.
//!
//! These only read what `session.login` returned; nothing here talks to
//! the router beyond the login the dispatcher already performed.

use serde::Serialize;
use tabled::Tabled;
use ubusly_api::{Acls, Client, Session};

use crate::cli::{GlobalOpts, SessionArgs, SessionCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

// ── Views ───────────────────────────────────────────────────────────

/// What `session show` prints. The token itself never leaves the process.
#[derive(Serialize)]
struct SessionView<'a> {
    username: Option<&'a str>,
    timeout: u64,
    expires: u64,
    data: &'a serde_json::Map<String, serde_json::Value>,
}

impl<'a> From<&'a Session> for SessionView<'a> {
    fn from(s: &'a Session) -> Self {
        Self {
            username: s.data.get("username").and_then(serde_json::Value::as_str),
            timeout: s.timeout,
            expires: s.expires,
            data: &s.data,
        }
    }
}

#[derive(Serialize)]
struct AclEntry {
    scope: &'static str,
    name: String,
    permissions: Vec<String>,
}

#[derive(Tabled)]
struct AclRow {
    #[tabled(rename = "Scope")]
    scope: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Permissions")]
    permissions: String,
}

impl From<&AclEntry> for AclRow {
    fn from(e: &AclEntry) -> Self {
        Self {
            scope: e.scope,
            name: e.name.clone(),
            permissions: e.permissions.join(", "),
        }
    }
}

fn acl_entries(acls: &Acls) -> Vec<AclEntry> {
    let scopes = [
        ("access-group", &acls.access_group),
        ("ubus", &acls.ubus),
        ("uci", &acls.uci),
    ];
    scopes
        .into_iter()
        .flat_map(|(scope, map)| {
            map.iter().map(move |(name, permissions)| AclEntry {
                scope,
                name: name.clone(),
                permissions: permissions.clone(),
            })
        })
        .collect()
}

fn detail(painter: Painter, view: &SessionView<'_>) -> String {
    output::detail_lines(
        painter,
        &[
            ("User", view.username.unwrap_or("-").to_owned()),
            ("Timeout", format!("{}s", view.timeout)),
            ("Expires in", format!("{}s", view.expires)),
        ],
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(client: &Client, args: SessionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    client.require_login()?;
    let session = client.session();
    let painter = Painter::new(&global.color);

    match args.command {
        SessionCommand::Show => {
            let view = SessionView::from(session);
            let out = output::render_single(
                &global.output,
                &view,
                |v| detail(painter, v),
                |v| v.username.unwrap_or_default().to_owned(),
            )?;
            output::print_output(&out, global.quiet);
        }

        SessionCommand::Acls => {
            let entries = acl_entries(&session.acls);
            let out = output::render_list(&global.output, &entries, |e| AclRow::from(e), |e| {
                format!("{}:{}", e.scope, e.name)
            })?;
            output::print_output(&out, global.quiet);
        }

        SessionCommand::Check { object, method } => {
            if !session.acls.allows(&object, &method) {
                return Err(CliError::PermissionDenied { object, method });
            }
            if !global.quiet {
                eprintln!("{} {object}.{method}", painter.good("✓ allowed"));
            }
        }
    }
    Ok(())
}
