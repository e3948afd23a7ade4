//! Validate command handler.

use rowsync_core::{Command as CoreCommand, CommandResult, Controller};

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::error::CliError;
use crate::output;

use super::export;

pub async fn handle(
    controller: &Controller,
    args: ValidateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    export::select(controller, args.selection).await?;
    let CommandResult::Validated(verdict) = controller.execute(CoreCommand::Validate).await?
    else {
        return Ok(());
    };

    if !verdict.passed {
        return Err(CliError::DocumentRejected {
            message: verdict
                .message
                .unwrap_or_else(|| "validation failed".into()),
        });
    }

    let detail = verdict.message.map(|m| format!(": {m}")).unwrap_or_default();
    output::print_status(&format!("Document is valid{detail}"), global.quiet);
    Ok(())
}
