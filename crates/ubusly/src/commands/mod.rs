//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod call;
pub mod config_cmd;
pub mod file;
pub mod log;
pub mod session;
pub mod uci;
pub mod util;
pub mod wireless;

use ubusly_api::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a bus-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &mut Client,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Call(args) => call::handle_call(client, args, global).await,
        Command::List(args) => call::handle_list(client, args, global).await,
        Command::Session(args) => session::handle(client, args, global),
        Command::File(args) => file::handle(client, args, global).await,
        Command::Log(args) => log::handle(client, args, global).await,
        Command::Uci(args) => uci::handle(client, args, global).await,
        Command::Wireless(args) => wireless::handle(client, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
