//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod attributes;
pub mod config_cmd;
pub mod dicts;
pub mod entities;
pub mod export;
pub mod files;
pub mod util;
pub mod validate;

use rowsync_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Entities(args) => entities::handle(controller, args, global).await,
        Command::Attributes(args) => attributes::handle(controller, args, global).await,
        Command::Files(args) => files::handle(controller, args, global).await,
        Command::Dicts(args) => dicts::handle(controller, args, global).await,
        Command::Export(args) => export::handle(controller, args, global).await,
        Command::Validate(args) => validate::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
