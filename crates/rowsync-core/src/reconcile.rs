// ── Reconciliation ──
//
// Merges a service row-set into the held hierarchy. Every function here is
// pure: it reads the prior hierarchy and returns a new one, sharing every
// entity and attribute it did not touch. Callers publish the result.
//
// Identity is always by id. Position in a response carries no meaning
// except for a full refresh.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::error::ConsistencyFault;
use crate::model::{Attribute, AttributeId, Entity, EntityId, EntityRow, FileId, Hierarchy, Row};

/// The kind of mutation a row-set answers, with enough context to find
/// its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Refresh,
    UpdateEntity {
        entity_id: EntityId,
    },
    UpdateAttribute {
        entity_id: EntityId,
        attribute_id: AttributeId,
    },
    AddEntity,
    AddAttribute {
        entity_id: EntityId,
    },
    CopyAttribute {
        entity_id: EntityId,
    },
    RemoveAttribute {
        entity_id: EntityId,
        attribute_id: AttributeId,
    },
    RemoveEntity {
        entity_id: EntityId,
    },
    RemoveFile {
        file_id: FileId,
    },
}

impl Mutation {
    /// The entity whose branch this mutation replaces, if it has one.
    pub fn target(&self) -> Option<EntityId> {
        match *self {
            Self::UpdateEntity { entity_id }
            | Self::UpdateAttribute { entity_id, .. }
            | Self::AddAttribute { entity_id }
            | Self::CopyAttribute { entity_id }
            | Self::RemoveAttribute { entity_id, .. }
            | Self::RemoveEntity { entity_id } => Some(entity_id),
            Self::Refresh | Self::AddEntity | Self::RemoveFile { .. } => None,
        }
    }
}

/// Outcome of a reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Applied {
        hierarchy: Hierarchy,
        /// The attribute appended by an add or copy.
        appended: Option<AttributeId>,
    },
    /// The target no longer exists; the response is discarded.
    Stale,
}

impl Reconciliation {
    fn applied(hierarchy: Hierarchy) -> Self {
        Self::Applied {
            hierarchy,
            appended: None,
        }
    }
}

/// Produce the next hierarchy for `mutation` given the service's `rows`.
pub fn reconcile(
    prior: &Hierarchy,
    mutation: Mutation,
    rows: Vec<Row>,
) -> Result<Reconciliation, ConsistencyFault> {
    debug!(?mutation, rows = rows.len(), "reconciling");
    match mutation {
        Mutation::Refresh => refresh(rows).map(Reconciliation::applied),
        Mutation::UpdateEntity { entity_id } => apply_field_update(prior, entity_id, None, rows),
        Mutation::UpdateAttribute {
            entity_id,
            attribute_id,
        } => apply_field_update(prior, entity_id, Some(attribute_id), rows),
        Mutation::AddEntity => append_entity(prior, rows).map(Reconciliation::applied),
        Mutation::AddAttribute { entity_id } | Mutation::CopyAttribute { entity_id } => {
            insert_attribute(prior, entity_id, rows)
        }
        Mutation::RemoveAttribute {
            entity_id,
            attribute_id,
        } => remove_attribute(prior, entity_id, attribute_id, rows),
        Mutation::RemoveEntity { entity_id } => Ok(remove_entity(prior, entity_id)),
        Mutation::RemoveFile { file_id } => Ok(Reconciliation::applied(remove_file(prior, file_id))),
    }
}

// ── Full refresh ─────────────────────────────────────────────────────

/// Build a hierarchy from a complete row-set.
///
/// Entity order follows the entity rows; attribute order within an entity
/// follows the attribute rows. Attribute rows whose entity is absent are
/// dropped.
pub fn refresh(rows: Vec<Row>) -> Result<Hierarchy, ConsistencyFault> {
    let mut entities: IndexMap<EntityId, Entity> = IndexMap::new();
    let mut attribute_rows = Vec::new();
    let mut seen = HashSet::new();

    for row in rows {
        match row {
            Row::Entity(row) => {
                if entities.contains_key(&row.id) {
                    return Err(ConsistencyFault::DuplicateEntityId { entity_id: row.id });
                }
                entities.insert(row.id, row.into_entity());
            }
            Row::Attribute(attr) => {
                if !seen.insert(attr.id) {
                    return Err(ConsistencyFault::DuplicateAttributeId {
                        attribute_id: attr.id,
                    });
                }
                attribute_rows.push(attr);
            }
        }
    }

    for attr in attribute_rows {
        match entities.get_mut(&attr.entity_id) {
            Some(entity) => entity.attributes.push(Arc::new(attr)),
            None => warn!(
                attribute_id = %attr.id,
                entity_id = %attr.entity_id,
                "dropping attribute row without an entity row"
            ),
        }
    }

    Ok(Hierarchy::new(entities.into_values().map(Arc::new).collect()))
}

// ── Field updates ────────────────────────────────────────────────────

/// Merge the revalidated slice returned by an entity or attribute edit.
///
/// Only the target entity changes. Its cells are replaced when the
/// response carries its row; each attribute is replaced by the response
/// row with the same id. No attribute is added or removed.
pub fn apply_field_update(
    prior: &Hierarchy,
    entity_id: EntityId,
    attribute_id: Option<AttributeId>,
    rows: Vec<Row>,
) -> Result<Reconciliation, ConsistencyFault> {
    let Some((index, current)) = prior.locate(entity_id) else {
        return Ok(Reconciliation::Stale);
    };
    if let Some(attribute_id) = attribute_id {
        if current.attribute(attribute_id).is_none() {
            return Ok(Reconciliation::Stale);
        }
    }

    let mut response = TargetRows::split(entity_id, rows)?;
    let attributes = response.overlay(&current.attributes);
    if !response.attributes.is_empty() {
        debug!(
            entity_id = %entity_id,
            ignored = response.attributes.len(),
            "field update returned attributes the entity does not hold"
        );
    }

    let cells = match response.entity {
        Some(row) => row.cells,
        None => current.cells.clone(),
    };
    let next = Entity {
        id: current.id,
        file_id: current.file_id,
        cells,
        attributes,
    };
    Ok(Reconciliation::applied(prior.replacing(index, next)))
}

// ── Structural changes ───────────────────────────────────────────────

/// Append a newly created entity with no attributes.
pub fn append_entity(prior: &Hierarchy, rows: Vec<Row>) -> Result<Hierarchy, ConsistencyFault> {
    let mut entity_rows = rows.into_iter().filter_map(|row| match row {
        Row::Entity(e) => Some(e),
        Row::Attribute(_) => None,
    });
    let row = entity_rows.next().ok_or(ConsistencyFault::MissingEntityRow)?;
    if let Some(extra) = entity_rows.next() {
        return Err(ConsistencyFault::ForeignEntityRow {
            expected: row.id,
            found: extra.id,
        });
    }
    if prior.contains(row.id) {
        return Err(ConsistencyFault::DuplicateEntityId { entity_id: row.id });
    }
    Ok(prior.appending(row.into_entity()))
}

/// Merge the response to an add-attribute or copy-attribute.
///
/// The response holds the entity's full attribute set, exactly one of
/// which is new. Existing attributes are overlaid by id, the new one is
/// appended. The entity's own error state is cleared before its returned
/// row (if any) is laid over it.
pub fn insert_attribute(
    prior: &Hierarchy,
    entity_id: EntityId,
    rows: Vec<Row>,
) -> Result<Reconciliation, ConsistencyFault> {
    let Some((index, current)) = prior.locate(entity_id) else {
        return Ok(Reconciliation::Stale);
    };
    let cleared = current.cells.cleared();
    let mut response = TargetRows::split(entity_id, rows)?;

    let existing: HashSet<AttributeId> = current.attributes.iter().map(|a| a.id).collect();
    let candidates: Vec<AttributeId> = response
        .attributes
        .keys()
        .filter(|id| !existing.contains(id))
        .copied()
        .collect();
    if candidates.len() > 1 {
        return Err(ConsistencyFault::AmbiguousNewAttribute {
            entity_id,
            candidates,
        });
    }
    let Some(&new_id) = candidates.first() else {
        return Err(ConsistencyFault::NoNewAttribute { entity_id });
    };
    if prior.iter().any(|e| e.id != entity_id && e.attribute(new_id).is_some()) {
        return Err(ConsistencyFault::DuplicateAttributeId {
            attribute_id: new_id,
        });
    }

    let Some(fresh) = response.attributes.swap_remove(&new_id) else {
        return Err(ConsistencyFault::NoNewAttribute { entity_id });
    };
    let mut attributes = response.overlay(&current.attributes);
    attributes.push(Arc::new(fresh));

    let cells = response.entity.map_or(cleared, |row| row.cells);
    let next = Entity {
        id: current.id,
        file_id: current.file_id,
        cells,
        attributes,
    };
    Ok(Reconciliation::Applied {
        hierarchy: prior.replacing(index, next),
        appended: Some(new_id),
    })
}

/// Merge the response to an attribute removal.
///
/// Clears the entity's error state, lays its returned row over it, and
/// drops the removed attribute.
pub fn remove_attribute(
    prior: &Hierarchy,
    entity_id: EntityId,
    attribute_id: AttributeId,
    rows: Vec<Row>,
) -> Result<Reconciliation, ConsistencyFault> {
    let Some((index, current)) = prior.locate(entity_id) else {
        return Ok(Reconciliation::Stale);
    };
    let response = TargetRows::split(entity_id, rows)?;
    if !response.attributes.is_empty() {
        debug!(
            entity_id = %entity_id,
            ignored = response.attributes.len(),
            "attribute rows in removal response"
        );
    }

    let cells = match response.entity {
        Some(row) => row.cells,
        None => current.cells.cleared(),
    };
    let next = Entity {
        id: current.id,
        file_id: current.file_id,
        cells,
        attributes: current
            .attributes
            .iter()
            .filter(|a| a.id != attribute_id)
            .cloned()
            .collect(),
    };
    Ok(Reconciliation::applied(prior.replacing(index, next)))
}

/// Drop one entity.
pub fn remove_entity(prior: &Hierarchy, entity_id: EntityId) -> Reconciliation {
    if !prior.contains(entity_id) {
        return Reconciliation::Stale;
    }
    Reconciliation::applied(prior.retaining(|e| e.id != entity_id))
}

/// Drop every entity produced by a provenance file.
pub fn remove_file(prior: &Hierarchy, file_id: FileId) -> Hierarchy {
    prior.retaining(|e| e.file_id != Some(file_id))
}

// ── Response partitioning ────────────────────────────────────────────

/// A row-set split into the target's entity row and its attribute rows.
struct TargetRows {
    entity: Option<EntityRow>,
    attributes: IndexMap<AttributeId, Attribute>,
}

impl TargetRows {
    fn split(target: EntityId, rows: Vec<Row>) -> Result<Self, ConsistencyFault> {
        let mut entity = None;
        let mut attributes = IndexMap::new();

        for row in rows {
            match row {
                Row::Entity(row) if row.id != target => {
                    return Err(ConsistencyFault::ForeignEntityRow {
                        expected: target,
                        found: row.id,
                    });
                }
                Row::Entity(row) => {
                    if entity.replace(row).is_some() {
                        return Err(ConsistencyFault::DuplicateEntityId { entity_id: target });
                    }
                }
                Row::Attribute(attr) if attr.entity_id != target => {
                    warn!(
                        entity_id = %target,
                        attribute_id = %attr.id,
                        owner = %attr.entity_id,
                        "ignoring attribute row for another entity"
                    );
                }
                Row::Attribute(attr) => {
                    let id = attr.id;
                    if attributes.insert(id, attr).is_some() {
                        return Err(ConsistencyFault::DuplicateAttributeId { attribute_id: id });
                    }
                }
            }
        }

        Ok(Self { entity, attributes })
    }

    /// Replace each held attribute by the response row with its id,
    /// consuming the rows used. Untouched attributes keep their `Arc`.
    fn overlay(&mut self, held: &[Arc<Attribute>]) -> Vec<Arc<Attribute>> {
        held.iter()
            .map(|attr| {
                self.attributes
                    .swap_remove(&attr.id)
                    .map_or_else(|| Arc::clone(attr), Arc::new)
            })
            .collect()
    }
}
