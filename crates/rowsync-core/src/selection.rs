// ── Export selection ──
//
// One map carries both levels of selection: a key marks its entity as
// checked, the set under it holds the attributes picked individually.
// The tracker stores whatever it is told. Gating on validation state is
// the caller's job (see `entity_selectable` / `attribute_selectable`).

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::{Attribute, AttributeId, Entity, EntityId, Hierarchy};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    entries: IndexMap<EntityId, IndexSet<AttributeId>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck an entity.
    ///
    /// Unchecking drops its attribute picks. Checking an already checked
    /// entity keeps them.
    pub fn set_entity_selected(&mut self, entity_id: EntityId, checked: bool) {
        if checked {
            self.entries.entry(entity_id).or_default();
        } else {
            self.entries.shift_remove(&entity_id);
        }
    }

    /// Replace the attribute picks of an entity wholesale.
    pub fn set_selected_attribute_ids(
        &mut self,
        entity_id: EntityId,
        ids: impl IntoIterator<Item = AttributeId>,
    ) {
        self.entries.insert(entity_id, ids.into_iter().collect());
    }

    pub fn is_entity_selected(&self, entity_id: EntityId) -> bool {
        self.entries.contains_key(&entity_id)
    }

    pub fn selected_attributes(&self, entity_id: EntityId) -> Option<&IndexSet<AttributeId>> {
        self.entries.get(&entity_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &IndexSet<AttributeId>)> {
        self.entries.iter().map(|(id, attrs)| (*id, attrs))
    }

    /// The export request body: entity id to picked attribute ids.
    ///
    /// Keys for entities missing from `hierarchy` are left out, as are
    /// picks for attributes the entity no longer holds. An empty map asks
    /// the service to export everything.
    pub fn export_payload(&self, hierarchy: &Hierarchy) -> BTreeMap<i64, Vec<i64>> {
        self.entries
            .iter()
            .filter_map(|(entity_id, picks)| {
                let entity = hierarchy.entity(*entity_id)?;
                let attrs = picks
                    .iter()
                    .filter(|id| entity.attribute(**id).is_some())
                    .map(|id| id.get())
                    .collect();
                Some((entity_id.get(), attrs))
            })
            .collect()
    }
}

// ── Gating ───────────────────────────────────────────────────────────

/// An entity can be checked only while none of its own cells is in error.
pub fn entity_selectable(entity: &Entity) -> bool {
    !entity.has_errors()
}

/// An attribute can be picked only while it has no errors of its own and
/// its entity carries no diagnostics.
pub fn attribute_selectable(entity: &Entity, attribute: &Attribute) -> bool {
    !entity.has_errors() && !attribute.has_errors()
}
