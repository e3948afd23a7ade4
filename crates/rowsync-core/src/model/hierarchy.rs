// ── Hierarchy ──
//
// The ordered sequence of entities, each carrying its attributes. It is
// only ever replaced wholesale: every reconciliation yields a new value
// that shares untouched entities with its predecessor.

use std::sync::Arc;

use serde::Serialize;

use super::attribute::Attribute;
use super::entity::Entity;
use super::ids::{AttributeId, EntityId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Hierarchy {
    entities: Vec<Arc<Entity>>,
}

impl Hierarchy {
    pub fn new(entities: Vec<Arc<Entity>>) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &[Arc<Entity>] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Arc<Entity>> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Index and value of an entity.
    pub(crate) fn locate(&self, id: EntityId) -> Option<(usize, &Arc<Entity>)> {
        self.entities.iter().enumerate().find(|(_, e)| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity(id).is_some()
    }

    pub fn attribute(&self, entity_id: EntityId, attribute_id: AttributeId) -> Option<&Arc<Attribute>> {
        self.entity(entity_id)?.attribute(attribute_id)
    }

    /// Total attributes across every entity.
    pub fn attribute_count(&self) -> usize {
        self.entities.iter().map(|e| e.attributes.len()).sum()
    }

    /// A copy with the entity at `index` swapped out. Every other entity
    /// keeps its allocation.
    pub(crate) fn replacing(&self, index: usize, entity: Entity) -> Self {
        let mut entities = self.entities.clone();
        if let Some(slot) = entities.get_mut(index) {
            *slot = Arc::new(entity);
        }
        Self { entities }
    }

    pub(crate) fn appending(&self, entity: Entity) -> Self {
        let mut entities = self.entities.clone();
        entities.push(Arc::new(entity));
        Self { entities }
    }

    pub(crate) fn retaining(&self, keep: impl Fn(&Entity) -> bool) -> Self {
        Self {
            entities: self.entities.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }
}
