// ── Entity domain type ──
//
// An entity is a table-like record: its own named cells plus an ordered
// list of attributes. Attributes are shared via `Arc` so a reconciliation
// that leaves an attribute alone hands the very same allocation to the
// next hierarchy.

use std::sync::Arc;

use serde::Serialize;

use super::attribute::Attribute;
use super::cell::Cell;
use super::field::{EntityField, EntityValues};
use super::ids::{AttributeId, EntityId, FileId};

/// Change-type value marking an entity scheduled for deletion.
pub const CHANGE_TYPE_DELETED: &str = "DELETED";

/// The named cells of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCells {
    pub schema_name: Cell,
    pub entity_name: Cell,
    pub entity_desc: Cell,
    pub table_type: Cell,
    pub change_type: Cell,
    pub dest_name: Cell,
    pub det_name: Cell,
    pub domain: Cell,
    pub conn_point: Cell,
}

impl EntityCells {
    pub fn cell(&self, field: EntityField) -> &Cell {
        match field {
            EntityField::SchemaName => &self.schema_name,
            EntityField::EntityName => &self.entity_name,
            EntityField::EntityDesc => &self.entity_desc,
            EntityField::TableType => &self.table_type,
            EntityField::ChangeType => &self.change_type,
            EntityField::DestName => &self.dest_name,
            EntityField::DetName => &self.det_name,
            EntityField::Domain => &self.domain,
            EntityField::ConnPoint => &self.conn_point,
        }
    }

    fn all(&self) -> [&Cell; 9] {
        [
            &self.schema_name,
            &self.entity_name,
            &self.entity_desc,
            &self.table_type,
            &self.change_type,
            &self.dest_name,
            &self.det_name,
            &self.domain,
            &self.conn_point,
        ]
    }

    pub fn has_errors(&self) -> bool {
        self.all().into_iter().any(Cell::error_flg)
    }

    /// Every field's current value.
    pub fn values(&self) -> EntityValues {
        EntityValues::collect(|field| self.cell(field).value().map(str::to_owned))
    }

    /// The same cells with every error flag and message reset.
    pub fn cleared(&self) -> Self {
        Self {
            schema_name: self.schema_name.cleared(),
            entity_name: self.entity_name.cleared(),
            entity_desc: self.entity_desc.cleared(),
            table_type: self.table_type.cleared(),
            change_type: self.change_type.cleared(),
            dest_name: self.dest_name.cleared(),
            det_name: self.det_name.cleared(),
            domain: self.domain.cleared(),
            conn_point: self.conn_point.cleared(),
        }
    }
}

/// An entity together with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    /// Provenance file, `None` for manually created entities.
    pub file_id: Option<FileId>,
    #[serde(flatten)]
    pub cells: EntityCells,
    pub attributes: Vec<Arc<Attribute>>,
}

impl Entity {
    pub fn name(&self) -> Option<&str> {
        self.cells.entity_name.value()
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&Arc<Attribute>> {
        self.attributes.iter().find(|a| a.id == id)
    }

    /// Any of the entity's own cells is in error. Attributes are not
    /// considered.
    pub fn has_errors(&self) -> bool {
        self.cells.has_errors()
    }

    /// Marked for deletion by its change type.
    pub fn is_deleted(&self) -> bool {
        self.cells.change_type.value() == Some(CHANGE_TYPE_DELETED)
    }

    /// Same identity and attributes, different cells.
    pub(crate) fn with_cells(&self, cells: EntityCells) -> Self {
        Self {
            id: self.id,
            file_id: self.file_id,
            cells,
            attributes: self.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationMessage;

    fn entity(change_type: &str) -> Entity {
        Entity {
            id: EntityId::new(1),
            file_id: None,
            cells: EntityCells {
                entity_name: Cell::new(Some("CLIENT".into()))
                    .with_messages(vec![ValidationMessage::new("reserved word")]),
                change_type: Cell::new(Some(change_type.into())),
                ..EntityCells::default()
            },
            attributes: Vec::new(),
        }
    }

    #[test]
    fn deleted_follows_change_type() {
        assert!(entity("DELETED").is_deleted());
        assert!(!entity("ADDED").is_deleted());
    }

    #[test]
    fn cleared_resets_every_cell() {
        let e = entity("ADDED");
        assert!(e.has_errors());
        let cleared = e.cells.cleared();
        assert!(!cleared.has_errors());
        assert_eq!(cleared.entity_name.value(), Some("CLIENT"));
    }

    #[test]
    fn values_read_through_field_accessor() {
        let values = entity("ADDED").cells.values();
        assert_eq!(values.get(EntityField::EntityName), Some("CLIENT"));
        assert_eq!(values.get(EntityField::Domain), None);
    }
}
