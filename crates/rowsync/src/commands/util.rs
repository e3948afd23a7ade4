//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use rowsync_core::{Attribute, Cell, Controller, Entity, EntityId};

use crate::error::CliError;

/// Look up a loaded entity, or fail with a pointer to `entities list`.
pub fn entity(controller: &Controller, id: i64) -> Result<Arc<Entity>, CliError> {
    controller
        .store()
        .entity_by_id(EntityId::new(id))
        .ok_or_else(|| CliError::NotFound {
            resource_type: "entity".into(),
            identifier: id.to_string(),
            list_command: "entities list".into(),
        })
}

/// Look up an attribute of a loaded entity.
pub fn attribute(
    controller: &Controller,
    entity_id: i64,
    attribute_id: i64,
) -> Result<Arc<Attribute>, CliError> {
    let owner = entity(controller, entity_id)?;
    owner
        .attributes
        .iter()
        .find(|a| a.id.get() == attribute_id)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "attribute".into(),
            identifier: attribute_id.to_string(),
            list_command: format!("attributes list {entity_id}"),
        })
}

/// One detail line per cell: value, the value it replaced, and every
/// validation message with its recommendation.
pub fn cell_lines(label: &str, cell: &Cell) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<18}{}",
        format!("{label}:"),
        cell.value().unwrap_or("-")
    )];
    if cell.is_modified() {
        lines.push(format!(
            "{:<18}(was {})",
            "",
            cell.original_value().unwrap_or("-")
        ));
    }
    for message in cell.messages() {
        lines.push(format!("{:<18}! {}", "", message.message));
        if let Some(ref recommendation) = message.recommendation {
            lines.push(format!("{:<18}  hint: {recommendation}", ""));
        }
        if let Some(ref example) = message.example {
            lines.push(format!("{:<18}  e.g. {example}", ""));
        }
    }
    lines
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
