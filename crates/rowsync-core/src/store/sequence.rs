// ── Request sequencing ──
//
// Every field update takes a ticket keyed by the record it edits: the
// entity's own cells, or one attribute. Its response is applied
// unless a newer response for the same record was applied first, or a
// structural mutation (add, copy, remove) was issued against the entity
// after it.
//
// Sequence numbers come from one counter shared by all entities, so a
// ticket can never match a counter that was forgotten and restarted.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::model::{AttributeId, EntityId};

/// The record a field update edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Target {
    pub entity_id: EntityId,
    /// `None` for the entity's own cells.
    pub attribute_id: Option<AttributeId>,
}

impl Target {
    pub(crate) fn entity(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            attribute_id: None,
        }
    }

    pub(crate) fn attribute(entity_id: EntityId, attribute_id: AttributeId) -> Self {
        Self {
            entity_id,
            attribute_id: Some(attribute_id),
        }
    }
}

/// Proof that a field update was issued at some point in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
    target: Target,
    seq: u64,
}

#[derive(Debug, Default)]
pub(crate) struct RequestSequencer {
    next: AtomicU64,
    /// Newest field-update ticket applied per record.
    applied: DashMap<Target, u64>,
    /// Newest structural request per entity.
    structural: DashMap<EntityId, u64>,
}

impl RequestSequencer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Issue a ticket for a field update of `target`.
    pub(crate) fn issue(&self, target: Target) -> Ticket {
        Ticket {
            target,
            seq: self.next_seq(),
        }
    }

    /// Record a structural request against `entity_id`. Field updates
    /// issued before it are superseded.
    pub(crate) fn restructure(&self, entity_id: EntityId) {
        let seq = self.next_seq();
        self.structural.insert(entity_id, seq);
    }

    /// Run `apply` if the ticket's response may still be applied, marking
    /// it as the newest applied one for its record. Returns `None` when the
    /// response is superseded.
    ///
    /// The record's entry stays locked while `apply` runs, so two responses
    /// for one record are applied in the order they are claimed.
    pub(crate) fn apply_if_current<T>(
        &self,
        ticket: Ticket,
        apply: impl FnOnce() -> T,
    ) -> Option<T> {
        let restructured = self
            .structural
            .get(&ticket.target.entity_id)
            .is_some_and(|seq| *seq > ticket.seq);
        if restructured {
            return None;
        }

        let mut applied = self.applied.entry(ticket.target).or_insert(0);
        if *applied > ticket.seq {
            return None;
        }
        *applied = ticket.seq;
        Some(apply())
    }

    /// Drop the bookkeeping of a removed entity. Outstanding tickets for it
    /// stay superseded.
    pub(crate) fn forget(&self, entity_id: EntityId) {
        self.applied.retain(|target, _| target.entity_id != entity_id);
        self.restructure(entity_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(entity: i64, attribute: i64) -> Target {
        Target::attribute(EntityId::new(entity), AttributeId::new(attribute))
    }

    #[test]
    fn older_response_after_newer_is_superseded() {
        let seq = RequestSequencer::new();
        let first = seq.issue(Target::entity(EntityId::new(1)));
        let second = seq.issue(Target::entity(EntityId::new(1)));

        assert_eq!(seq.apply_if_current(second, || ()), Some(()));
        assert_eq!(seq.apply_if_current(first, || ()), None);
    }

    #[test]
    fn older_response_arriving_first_still_applies() {
        let seq = RequestSequencer::new();
        let first = seq.issue(Target::entity(EntityId::new(1)));
        let second = seq.issue(Target::entity(EntityId::new(1)));

        assert_eq!(seq.apply_if_current(first, || ()), Some(()));
        assert_eq!(seq.apply_if_current(second, || ()), Some(()));
    }

    #[test]
    fn sibling_attributes_are_sequenced_independently() {
        let seq = RequestSequencer::new();
        let a = seq.issue(attr(1, 11));
        let b = seq.issue(attr(1, 12));
        let own = seq.issue(Target::entity(EntityId::new(1)));

        assert_eq!(seq.apply_if_current(b, || ()), Some(()));
        assert_eq!(seq.apply_if_current(own, || ()), Some(()));
        assert_eq!(seq.apply_if_current(a, || ()), Some(()));
    }

    #[test]
    fn failed_newer_request_does_not_block_older_response() {
        let seq = RequestSequencer::new();
        let first = seq.issue(attr(1, 11));
        // Issued but never applied: its request failed.
        let _second = seq.issue(attr(1, 11));

        assert_eq!(seq.apply_if_current(first, || ()), Some(()));
    }

    #[test]
    fn structural_request_supersedes_pending_updates() {
        let seq = RequestSequencer::new();
        let before = seq.issue(attr(1, 11));
        let other_entity = seq.issue(attr(2, 21));
        seq.restructure(EntityId::new(1));
        let after = seq.issue(attr(1, 11));

        assert_eq!(seq.apply_if_current(before, || ()), None);
        assert_eq!(seq.apply_if_current(other_entity, || ()), Some(()));
        assert_eq!(seq.apply_if_current(after, || ()), Some(()));
    }

    #[test]
    fn forgotten_tickets_stay_superseded() {
        let seq = RequestSequencer::new();
        let ticket = seq.issue(Target::entity(EntityId::new(1)));
        seq.forget(EntityId::new(1));

        assert_eq!(seq.apply_if_current(ticket, || ()), None);
    }
}
