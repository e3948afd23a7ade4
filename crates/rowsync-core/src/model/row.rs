// ── Row-set ──
//
// The flat shape every mutation response arrives in: zero or more entity
// rows and attribute rows, mixed, in no meaningful order (except for a
// full fetch). The reconciler is the only consumer.

use super::attribute::Attribute;
use super::entity::{Entity, EntityCells};
use super::ids::{EntityId, FileId};

/// An entity's own cells as returned by the service, without attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub id: EntityId,
    pub file_id: Option<FileId>,
    pub cells: EntityCells,
}

impl EntityRow {
    /// An entity with no attributes yet.
    pub fn into_entity(self) -> Entity {
        Entity {
            id: self.id,
            file_id: self.file_id,
            cells: self.cells,
            attributes: Vec::new(),
        }
    }
}

/// One row of a row-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Entity(EntityRow),
    Attribute(Attribute),
}
