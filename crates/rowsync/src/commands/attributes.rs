//! Attribute command handlers.

use std::sync::Arc;

use strum::IntoEnumIterator;
use tabled::Tabled;

use rowsync_core::{
    Attribute, AttributeField, AttributeId, Command as CoreCommand, CommandResult, Controller,
    EntityId,
};

use crate::cli::{AttributesArgs, AttributesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    attr_type: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Prec")]
    precision: String,
    #[tabled(rename = "Mand")]
    mandatory: String,
    #[tabled(rename = "PK")]
    pk: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Errors")]
    errors: String,
}

fn row(a: &Arc<Attribute>, color: bool) -> AttributeRow {
    let cell = |field| {
        let c = a.cells.cell(field);
        output::flagged(c.value(), c.error_flg(), color)
    };
    let in_error = AttributeField::iter()
        .filter(|f| a.cells.cell(*f).error_flg())
        .count();

    AttributeRow {
        id: a.id.get(),
        name: cell(AttributeField::AttrName),
        attr_type: cell(AttributeField::AttrType),
        size: cell(AttributeField::AttrSize),
        precision: cell(AttributeField::AttrPrec),
        mandatory: cell(AttributeField::AttrMand),
        pk: cell(AttributeField::AttrPk),
        change: cell(AttributeField::ChangeType),
        errors: output::error_marker(in_error, color),
    }
}

fn detail(a: &Arc<Attribute>) -> String {
    let mut lines = vec![
        format!("{:<18}{}", "ID:", a.id),
        format!("{:<18}{}", "Entity:", a.entity_id),
    ];
    for field in AttributeField::iter() {
        lines.extend(util::cell_lines(field.label(), a.cells.cell(field)));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: AttributesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.refresh_rows().await?;

    match args.command {
        AttributesCommand::List { entity } => {
            let owner = util::entity(controller, entity)?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &owner.attributes,
                |a| row(a, color),
                |a| a.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AttributesCommand::Set {
            entity,
            attribute,
            field,
            value,
        } => {
            let result = controller
                .execute(CoreCommand::UpdateAttribute {
                    entity_id: EntityId::new(entity),
                    attribute_id: AttributeId::new(attribute),
                    field,
                    value,
                })
                .await?;
            if result == CommandResult::Discarded {
                output::print_status(
                    "Update accepted; the attribute changed meanwhile",
                    global.quiet,
                );
                return Ok(());
            }
            print_attribute(controller, entity, attribute, global)
        }

        AttributesCommand::Add { entity } => {
            let result = controller
                .execute(CoreCommand::AddAttribute {
                    entity_id: EntityId::new(entity),
                })
                .await?;
            print_created(controller, &result, global)
        }

        AttributesCommand::Copy { entity, attribute } => {
            let result = controller
                .execute(CoreCommand::CopyAttribute {
                    entity_id: EntityId::new(entity),
                    attribute_id: AttributeId::new(attribute),
                })
                .await?;
            print_created(controller, &result, global)
        }

        AttributesCommand::Remove { entity, attribute } => {
            let a = util::attribute(controller, entity, attribute)?;
            let prompt = format!(
                "Delete attribute {attribute} ({}) of entity {entity}?",
                a.name().unwrap_or("unnamed")
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::RemoveAttribute {
                    entity_id: EntityId::new(entity),
                    attribute_id: AttributeId::new(attribute),
                })
                .await?;
            output::print_status(&format!("Attribute {attribute} deleted"), global.quiet);
            Ok(())
        }
    }
}

fn print_created(
    controller: &Controller,
    result: &CommandResult,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // A created response that carried no new row leaves nothing to show.
    let CommandResult::AttributeCreated {
        entity_id,
        attribute_id,
    } = result
    else {
        return Ok(());
    };
    output::print_status(&format!("Attribute {attribute_id} created"), global.quiet);
    print_attribute(controller, entity_id.get(), attribute_id.get(), global)
}

fn print_attribute(
    controller: &Controller,
    entity: i64,
    attribute: i64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let a = util::attribute(controller, entity, attribute)?;
    let out = output::render_single(&global.output, &a, detail, |a| a.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
