// ── Filter predicates for hierarchy snapshots ──
//
// Used to derive views without re-querying the service.

use indexmap::IndexSet;

use crate::model::{Entity, FileId};

/// Filter predicate for entities.
pub enum EntityFilter {
    /// Visibility under a set of toggled provenance files: entities without
    /// a file are always shown, and an empty set shows everything.
    Files(IndexSet<FileId>),
    /// Entities imported from one file.
    ByFile(FileId),
    /// Entities with a diagnostic on any of their own or their attributes'
    /// cells.
    WithErrors,
}

impl EntityFilter {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::Files(toggled) => match entity.file_id {
                None => true,
                Some(file) => toggled.is_empty() || toggled.contains(&file),
            },
            Self::ByFile(file) => entity.file_id == Some(*file),
            Self::WithErrors => {
                entity.has_errors() || entity.attributes.iter().any(|a| a.has_errors())
            }
        }
    }
}
