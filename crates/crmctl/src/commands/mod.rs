//! Command dispatch: bridges CLI args -> console operations -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod leads;
pub mod records;
pub mod stages;
pub mod util;

use crmctl_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(console, args, global).await,
        Command::Logout => auth::logout(console, global),
        Command::Whoami => auth::whoami(console, global),
        Command::Users(args) => records::handle(console, "user", args.command, global).await,
        Command::Roles(args) => records::handle(console, "role", args.command, global).await,
        Command::Contacts(args) => records::handle(console, "contact", args.command, global).await,
        Command::Leads(args) => leads::handle(console, args, global).await,
        Command::Pipelines(args) => records::handle(console, "pipeline", args.command, global).await,
        Command::Stages(args) => stages::handle(console, args, global).await,
        Command::Filters(args) => records::handle(console, "filter", args.command, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
