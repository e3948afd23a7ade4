//! Entity command handlers.

use std::sync::Arc;

use strum::IntoEnumIterator;
use tabled::Tabled;

use rowsync_core::{
    Command as CoreCommand, CommandResult, Controller, Entity, EntityField, EntityFilter,
    EntityId, FileId,
};

use crate::cli::{EntitiesArgs, EntitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Schema")]
    schema: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Table Type")]
    table_type: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Attrs")]
    attributes: usize,
    #[tabled(rename = "Errors")]
    errors: String,
}

fn row(e: &Arc<Entity>, color: bool) -> EntityRow {
    let cell = |field| {
        let c = e.cells.cell(field);
        output::flagged(c.value(), c.error_flg(), color)
    };
    let in_error = EntityField::iter()
        .filter(|f| e.cells.cell(*f).error_flg())
        .count()
        + e.attributes.iter().filter(|a| a.has_errors()).count();

    EntityRow {
        id: e.id.get(),
        schema: cell(EntityField::SchemaName),
        name: cell(EntityField::EntityName),
        table_type: cell(EntityField::TableType),
        change: cell(EntityField::ChangeType),
        file: e.file_id.map_or_else(|| "manual".into(), |f| f.to_string()),
        attributes: e.attributes.len(),
        errors: output::error_marker(in_error, color),
    }
}

fn detail(e: &Arc<Entity>) -> String {
    let mut lines = vec![
        format!("{:<18}{}", "ID:", e.id),
        format!(
            "{:<18}{}",
            "File:",
            e.file_id.map_or_else(|| "manual".into(), |f| f.to_string())
        ),
    ];
    for field in EntityField::iter() {
        lines.extend(util::cell_lines(field.label(), e.cells.cell(field)));
    }
    lines.push(format!("{:<18}{}", "Attributes:", e.attributes.len()));
    if e.is_deleted() {
        lines.push("Marked DELETED: attributes cannot be added or copied.".into());
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.refresh().await?;

    match args.command {
        EntitiesCommand::List { files, errors } => {
            for file_id in files {
                controller
                    .execute(CoreCommand::ToggleFileFilter {
                        file_id: FileId::new(file_id),
                    })
                    .await?;
            }
            let mut entities = controller.visible_entities();
            if errors {
                entities.retain(|e| EntityFilter::WithErrors.matches(e));
            }
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &entities,
                |e| row(e, color),
                |e| e.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntitiesCommand::Get { entity } => {
            let e = util::entity(controller, entity)?;
            let out = output::render_single(&global.output, &e, detail, |e| e.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntitiesCommand::Set {
            entity,
            field,
            value,
        } => {
            let result = controller
                .execute(CoreCommand::UpdateEntity {
                    entity_id: EntityId::new(entity),
                    field,
                    value,
                })
                .await?;
            if result == CommandResult::Discarded {
                output::print_status("Update accepted; the entity changed meanwhile", global.quiet);
                return Ok(());
            }
            let e = util::entity(controller, entity)?;
            let out = output::render_single(&global.output, &e, detail, |e| e.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EntitiesCommand::Add => {
            let result = controller.execute(CoreCommand::AddEntity).await?;
            print_created(controller, &result, global)
        }

        EntitiesCommand::Copy { entity } => {
            let result = controller
                .execute(CoreCommand::CopyEntity {
                    entity_id: EntityId::new(entity),
                })
                .await?;
            print_created(controller, &result, global)
        }

        EntitiesCommand::Remove { entity } => {
            let e = util::entity(controller, entity)?;
            let label = e.name().unwrap_or("unnamed");
            let prompt = format!(
                "Delete entity {entity} ({label}) and its {} attributes?",
                e.attributes.len()
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::RemoveEntity {
                    entity_id: EntityId::new(entity),
                })
                .await?;
            output::print_status(&format!("Entity {entity} deleted"), global.quiet);
            Ok(())
        }
    }
}

fn print_created(
    controller: &Controller,
    result: &CommandResult,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let CommandResult::EntityCreated { entity_id } = result else {
        return Ok(());
    };
    output::print_status(&format!("Entity {entity_id} created"), global.quiet);
    let e = util::entity(controller, entity_id.get())?;
    let out = output::render_single(&global.output, &e, detail, |e| e.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
