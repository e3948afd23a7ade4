//! Export command handler.

use rowsync_core::{AttributeId, Command as CoreCommand, CommandResult, Controller, EntityId};

use crate::cli::{ExportArgs, GlobalOpts, SelectionArgs};
use crate::error::CliError;
use crate::output;

/// Load the rows and check the requested entities and attributes.
/// Returns how many entities ended up selected.
pub(super) async fn select(
    controller: &Controller,
    selection: SelectionArgs,
) -> Result<usize, CliError> {
    controller.refresh_rows().await?;

    for entity in selection.entities {
        controller
            .execute(CoreCommand::SelectEntity {
                entity_id: EntityId::new(entity),
                checked: true,
            })
            .await?;
    }
    for pick in selection.picks {
        controller
            .execute(CoreCommand::SelectAttributes {
                entity_id: EntityId::new(pick.entity),
                attribute_ids: pick.attributes.into_iter().map(AttributeId::new).collect(),
            })
            .await?;
    }

    Ok(controller.selection_snapshot().len())
}

pub async fn handle(
    controller: &Controller,
    args: ExportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let selected = select(controller, args.selection).await?;
    let CommandResult::Exported(text) = controller.execute(CoreCommand::Export).await? else {
        return Ok(());
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, &text)?;
            let scope = if selected == 0 {
                "all entities".to_owned()
            } else {
                format!("{selected} entities")
            };
            output::print_status(
                &format!("Exported {scope} to {}", path.display()),
                global.quiet,
            );
        }
        None => output::print_output(&text, global.quiet),
    }
    Ok(())
}
