mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a router connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "ubusly", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the bus
        cmd => {
            let (conn, profile_name) = config::resolve_connection(&cli.global)?;
            let mut client = conn.connect().await.map_err(|e| {
                if e.is_permission_denied() {
                    CliError::AuthFailed {
                        username: conn.username.clone(),
                        profile: profile_name.clone(),
                    }
                } else {
                    CliError::from(e)
                }
            })?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &mut client, &cli.global).await;

            if client.session().is_authenticated() {
                if let Err(e) = client.logout().await {
                    warn!(error = %e, "failed to close the session");
                }
            }

            result.map_err(|err| match err {
                CliError::NoCredentials { .. } => CliError::NoCredentials {
                    profile: profile_name,
                },
                other => other,
            })
        }
    }
}
