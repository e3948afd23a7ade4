// ── Attribute domain type ──

use serde::Serialize;

use super::cell::Cell;
use super::field::{AttributeField, AttributeValues};
use super::ids::{AttributeId, EntityId, FileId};

/// The named cells of an attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeCells {
    pub attr_name: Cell,
    pub attr_desc: Cell,
    pub attr_type: Cell,
    pub attr_size: Cell,
    pub attr_prec: Cell,
    pub attr_mand: Cell,
    pub attr_pk: Cell,
    pub change_type: Cell,
}

impl AttributeCells {
    pub fn cell(&self, field: AttributeField) -> &Cell {
        match field {
            AttributeField::AttrName => &self.attr_name,
            AttributeField::AttrDesc => &self.attr_desc,
            AttributeField::AttrType => &self.attr_type,
            AttributeField::AttrSize => &self.attr_size,
            AttributeField::AttrPrec => &self.attr_prec,
            AttributeField::AttrMand => &self.attr_mand,
            AttributeField::AttrPk => &self.attr_pk,
            AttributeField::ChangeType => &self.change_type,
        }
    }

    pub fn has_errors(&self) -> bool {
        [
            &self.attr_name,
            &self.attr_desc,
            &self.attr_type,
            &self.attr_size,
            &self.attr_prec,
            &self.attr_mand,
            &self.attr_pk,
            &self.change_type,
        ]
        .into_iter()
        .any(Cell::error_flg)
    }

    /// Every field's current value.
    pub fn values(&self) -> AttributeValues {
        AttributeValues::collect(|field| self.cell(field).value().map(str::to_owned))
    }
}

/// A column of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: AttributeId,
    pub entity_id: EntityId,
    /// Provenance file, `None` for manually created attributes.
    pub file_id: Option<FileId>,
    #[serde(flatten)]
    pub cells: AttributeCells,
}

impl Attribute {
    pub fn name(&self) -> Option<&str> {
        self.cells.attr_name.value()
    }

    pub fn has_errors(&self) -> bool {
        self.cells.has_errors()
    }
}
