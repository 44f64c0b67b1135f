//! System log handlers.

use tabled::Tabled;
use ubusly_api::{Client, LogEntry, LogRead};

use crate::cli::{GlobalOpts, LogArgs, LogCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Level")]
    level: &'static str,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&LogEntry> for LogRow {
    fn from(e: &LogEntry) -> Self {
        Self {
            time: util::format_unix_millis(e.time),
            level: e.severity(),
            message: e.msg.clone(),
        }
    }
}

/// `time level message`, syslog style.
fn plain_line(e: &LogEntry) -> String {
    format!(
        "{} {} {}",
        util::format_unix_millis(e.time),
        e.severity(),
        e.msg
    )
}

pub async fn handle(
    client: &mut Client,
    args: LogArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LogCommand::Read { lines } => {
            let entries = client
                .log_read(LogRead {
                    lines,
                    ..LogRead::default()
                })
                .await?;
            let out = output::render_list(
                &global.output,
                &entries.log,
                |e| LogRow::from(e),
                plain_line,
            )?;
            output::print_output(&out, global.quiet);
        }

        LogCommand::Write { message } => {
            client.log_write(&message).await?;
            if !global.quiet {
                let painter = Painter::new(&global.color);
                eprintln!("{}", painter.good("✓ logged"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_carries_severity() {
        let entry = LogEntry {
            msg: "dnsmasq started".into(),
            priority: 30,
            time: 1_700_000_000_000,
            ..LogEntry::default()
        };
        let row = LogRow::from(&entry);
        assert_eq!(row.level, "info");
        assert_eq!(row.message, "dnsmasq started");
        assert!(plain_line(&entry).ends_with("info dnsmasq started"));
    }
}
