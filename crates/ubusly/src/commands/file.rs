//! File command handlers (rpcd-mod-file).

use std::io::Write;

use tabled::Tabled;
use ubusly_api::{Client, ExecResult, FileEntry, FileStat, FileWrite};

use crate::cli::{FileArgs, FileCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Size")]
    size: u64,
    #[tabled(rename = "Modified")]
    mtime: String,
}

impl From<&FileEntry> for EntryRow {
    fn from(e: &FileEntry) -> Self {
        Self {
            name: e.name.clone(),
            kind: e.kind.clone(),
            mode: format_mode(e.mode),
            size: e.size,
            mtime: util::format_unix(e.mtime),
        }
    }
}

fn format_mode(mode: u32) -> String {
    format!("{:04o}", mode & 0o7777)
}

fn stat_detail(painter: Painter, s: &FileStat) -> String {
    output::detail_lines(
        painter,
        &[
            ("Path", s.path.clone()),
            ("Type", s.kind.clone()),
            ("Size", s.size.to_string()),
            ("Mode", format_mode(s.mode)),
            ("Owner", format!("{}:{}", s.uid, s.gid)),
            ("Inode", s.inode.to_string()),
            ("Accessed", util::format_unix(s.atime)),
            ("Modified", util::format_unix(s.mtime)),
            ("Changed", util::format_unix(s.ctime)),
        ],
    )
}

/// Stream exec output the way the command itself would have.
fn print_exec(result: &ExecResult) -> Result<(), CliError> {
    std::io::stdout().write_all(result.stdout.as_bytes())?;
    std::io::stderr().write_all(result.stderr.as_bytes())?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    client: &mut Client,
    args: FileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let painter = Painter::new(&global.color);

    match args.command {
        FileCommand::List { path } => {
            let listing = client.file_list(&path).await?;
            let out = output::render_list(
                &global.output,
                &listing.entries,
                |e| EntryRow::from(e),
                |e| e.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
        }

        FileCommand::Stat { path } => {
            let stat = client.file_stat(&path).await?;
            let out = output::render_single(
                &global.output,
                &stat,
                |s| stat_detail(painter, s),
                |s| s.path.clone(),
            )?;
            output::print_output(&out, global.quiet);
        }

        FileCommand::Read { path } => {
            let content = client.file_read(&path).await?;
            match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    if !global.quiet {
                        std::io::stdout().write_all(content.data.as_bytes())?;
                    }
                }
                _ => {
                    let out = output::render_single(
                        &global.output,
                        &content,
                        |c| c.data.clone(),
                        |c| c.data.clone(),
                    )?;
                    output::print_output(&out, global.quiet);
                }
            }
        }

        FileCommand::Write {
            path,
            data,
            append,
            mode,
            base64,
        } => {
            let data = match data {
                Some(data) => data,
                None => util::read_stdin()?,
            };

            client.require_login()?;
            if !append {
                // stat may be denied while write is granted; treat that as present
                let exists =
                    !matches!(client.file_stat(&path).await, Err(ref e) if e.is_not_found());
                if exists
                    && !util::confirm(&format!("Overwrite {path}?"), "file write", global.yes)?
                {
                    return Ok(());
                }
            }

            let mut write = FileWrite::new(path.clone(), data).append(append);
            if let Some(mode) = mode {
                write = write.mode(mode);
            }
            if base64 {
                write = write.base64(true);
            }
            client.file_write(&write).await?;

            if !global.quiet {
                eprintln!("{} {path}", painter.good("✓ wrote"));
            }
        }

        FileCommand::Exec { command, params } => {
            let params: Vec<&str> = params.iter().map(String::as_str).collect();
            let result = client.file_exec(&command, &params).await?;

            match global.output {
                OutputFormat::Table | OutputFormat::Plain => print_exec(&result)?,
                _ => {
                    let out = output::render_single(
                        &global.output,
                        &result,
                        |r| r.stdout.clone(),
                        |r| r.stdout.clone(),
                    )?;
                    output::print_output(&out, global.quiet);
                }
            }

            if result.code != 0 {
                return Err(CliError::ExecFailed {
                    command,
                    code: result.code,
                });
            }
        }
    }
    Ok(())
}
