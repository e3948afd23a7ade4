// ── Central reactive data store ──
//
// Holds the hierarchy, the export selection, the provenance files and the
// lookup dictionaries, each behind its own `watch` channel. Readers always
// get one complete snapshot; writers replace the snapshot wholesale.

use std::sync::Arc;

use indexmap::IndexSet;
use strum::{Display, EnumIter};
use tokio::sync::watch;
use tracing::debug;

use crate::error::ConsistencyFault;
use crate::filter::EntityFilter;
use crate::model::{
    AttributeId, Dictionaries, Entity, EntityId, FileContainer, FileId, Hierarchy, Row,
};
use crate::reconcile::{Mutation, Reconciliation, reconcile};
use crate::selection::Selection;

/// Load state of one collection. A failed load returns to `Idle` and
/// keeps whatever data the last successful load produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadStatus {
    Idle,
    Loading,
    Succeeded,
}

/// The independently loaded collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Rows,
    Files,
    Dictionaries,
}

/// What became of a reconciled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Publication {
    Published { appended: Option<AttributeId> },
    Stale,
}

/// Central reactive store.
///
/// Every reconciliation runs inside the hierarchy channel's write lock,
/// so two responses arriving together are merged one after the other and
/// no reader ever sees a partial merge.
pub struct DataStore {
    hierarchy: watch::Sender<Arc<Hierarchy>>,
    selection: watch::Sender<Arc<Selection>>,
    files: watch::Sender<Arc<Vec<Arc<FileContainer>>>>,
    file_filter: watch::Sender<Arc<IndexSet<FileId>>>,
    dictionaries: watch::Sender<Arc<Dictionaries>>,
    rows_status: watch::Sender<LoadStatus>,
    files_status: watch::Sender<LoadStatus>,
    dictionaries_status: watch::Sender<LoadStatus>,
}

impl DataStore {
    pub fn new() -> Self {
        let (hierarchy, _) = watch::channel(Arc::new(Hierarchy::default()));
        let (selection, _) = watch::channel(Arc::new(Selection::new()));
        let (files, _) = watch::channel(Arc::new(Vec::new()));
        let (file_filter, _) = watch::channel(Arc::new(IndexSet::new()));
        let (dictionaries, _) = watch::channel(Arc::new(Dictionaries::default()));
        let (rows_status, _) = watch::channel(LoadStatus::Idle);
        let (files_status, _) = watch::channel(LoadStatus::Idle);
        let (dictionaries_status, _) = watch::channel(LoadStatus::Idle);

        Self {
            hierarchy,
            selection,
            files,
            file_filter,
            dictionaries,
            rows_status,
            files_status,
            dictionaries_status,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn hierarchy_snapshot(&self) -> Arc<Hierarchy> {
        self.hierarchy.borrow().clone()
    }

    pub fn selection_snapshot(&self) -> Arc<Selection> {
        self.selection.borrow().clone()
    }

    pub fn files_snapshot(&self) -> Arc<Vec<Arc<FileContainer>>> {
        self.files.borrow().clone()
    }

    /// Files currently toggled for filtering.
    pub fn file_filter_snapshot(&self) -> Arc<IndexSet<FileId>> {
        self.file_filter.borrow().clone()
    }

    pub fn dictionaries_snapshot(&self) -> Arc<Dictionaries> {
        self.dictionaries.borrow().clone()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn entity_by_id(&self, id: EntityId) -> Option<Arc<Entity>> {
        self.hierarchy.borrow().entity(id).cloned()
    }

    pub fn file_by_id(&self, id: FileId) -> Option<Arc<FileContainer>> {
        self.files.borrow().iter().find(|f| f.id == id).cloned()
    }

    /// Entities shown under the current file filter.
    pub fn visible_entities(&self) -> Vec<Arc<Entity>> {
        let filter = EntityFilter::Files(self.file_filter_snapshot().as_ref().clone());
        self.hierarchy
            .borrow()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    // ── Status ───────────────────────────────────────────────────────

    fn status_sender(&self, collection: Collection) -> &watch::Sender<LoadStatus> {
        match collection {
            Collection::Rows => &self.rows_status,
            Collection::Files => &self.files_status,
            Collection::Dictionaries => &self.dictionaries_status,
        }
    }

    pub fn status(&self, collection: Collection) -> LoadStatus {
        *self.status_sender(collection).borrow()
    }

    pub(crate) fn set_status(&self, collection: Collection, status: LoadStatus) {
        self.status_sender(collection).send_replace(status);
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Reconcile `rows` into the held hierarchy and publish the result.
    ///
    /// Nothing is published for a stale response or a consistency fault.
    pub(crate) fn apply(
        &self,
        mutation: Mutation,
        rows: Vec<Row>,
    ) -> Result<Publication, ConsistencyFault> {
        let mut outcome = Ok(Publication::Stale);
        self.hierarchy
            .send_if_modified(|current| match reconcile(current, mutation, rows) {
                Ok(Reconciliation::Applied {
                    hierarchy,
                    appended,
                }) => {
                    *current = Arc::new(hierarchy);
                    outcome = Ok(Publication::Published { appended });
                    true
                }
                Ok(Reconciliation::Stale) => {
                    debug!(?mutation, "target vanished, response discarded");
                    false
                }
                Err(fault) => {
                    outcome = Err(fault);
                    false
                }
            });
        outcome
    }

    pub(crate) fn update_selection(&self, f: impl FnOnce(&mut Selection)) {
        self.selection.send_modify(|sel| f(Arc::make_mut(sel)));
    }

    pub(crate) fn replace_files(&self, files: Vec<FileContainer>) {
        self.files
            .send_replace(Arc::new(files.into_iter().map(Arc::new).collect()));
    }

    /// Forget a deleted file: drop it from the list and the filter.
    pub(crate) fn drop_file(&self, id: FileId) {
        self.files.send_if_modified(|files| {
            let before = files.len();
            let kept: Vec<_> = files.iter().filter(|f| f.id != id).cloned().collect();
            let changed = kept.len() != before;
            if changed {
                *files = Arc::new(kept);
            }
            changed
        });
        self.file_filter.send_if_modified(|filter| {
            if filter.contains(&id) {
                Arc::make_mut(filter).shift_remove(&id);
                true
            } else {
                false
            }
        });
    }

    /// Flip a file in or out of the filter. Returns whether it is now in.
    pub(crate) fn toggle_file(&self, id: FileId) -> bool {
        let mut now_in = false;
        self.file_filter.send_modify(|filter| {
            let filter = Arc::make_mut(filter);
            now_in = if filter.shift_remove(&id) {
                false
            } else {
                filter.insert(id);
                true
            };
        });
        now_in
    }

    pub(crate) fn update_dictionaries(&self, f: impl FnOnce(&mut Dictionaries)) {
        self.dictionaries.send_modify(|dicts| f(Arc::make_mut(dicts)));
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{EntityCells, EntityRow};

    fn row(id: i64, file: Option<i64>) -> Row {
        Row::Entity(EntityRow {
            id: EntityId::new(id),
            file_id: file.map(FileId::new),
            cells: EntityCells::default(),
        })
    }

    fn file(id: i64) -> FileContainer {
        FileContainer {
            id: FileId::new(id),
            name: format!("f{id}"),
            ext: "xlsx".into(),
            full_name: format!("f{id}.xlsx"),
            created_by: String::new(),
            created_at: String::new(),
            loaded_at: String::new(),
            modified_at: String::new(),
            messages: Vec::new(),
        }
    }

    #[test]
    fn apply_publishes_without_subscribers() {
        let store = DataStore::new();
        let outcome = store.apply(Mutation::Refresh, vec![row(1, None)]).unwrap();

        assert_eq!(outcome, Publication::Published { appended: None });
        assert_eq!(store.hierarchy_snapshot().len(), 1);
    }

    #[test]
    fn fault_leaves_hierarchy_untouched() {
        let store = DataStore::new();
        store.apply(Mutation::Refresh, vec![row(1, None)]).unwrap();
        let before = store.hierarchy_snapshot();

        let fault = store.apply(Mutation::AddEntity, Vec::new()).unwrap_err();
        assert_eq!(fault, ConsistencyFault::MissingEntityRow);
        assert!(Arc::ptr_eq(&before, &store.hierarchy_snapshot()));
    }

    #[test]
    fn stale_response_is_not_published() {
        let store = DataStore::new();
        let rx = store.hierarchy.subscribe();

        let outcome = store
            .apply(Mutation::UpdateEntity { entity_id: EntityId::new(9) }, vec![row(9, None)])
            .unwrap();
        assert_eq!(outcome, Publication::Stale);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn visibility_follows_file_filter() {
        let store = DataStore::new();
        store
            .apply(Mutation::Refresh, vec![row(1, Some(10)), row(2, Some(20)), row(3, None)])
            .unwrap();
        assert_eq!(store.visible_entities().len(), 3);

        assert!(store.toggle_file(FileId::new(10)));
        let ids: Vec<i64> = store.visible_entities().iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);

        assert!(!store.toggle_file(FileId::new(10)));
        assert_eq!(store.visible_entities().len(), 3);
    }

    #[test]
    fn dropping_a_file_clears_it_from_the_filter() {
        let store = DataStore::new();
        store.replace_files(vec![file(10), file(20)]);
        store.toggle_file(FileId::new(10));

        store.drop_file(FileId::new(10));
        assert_eq!(store.files_snapshot().len(), 1);
        assert!(store.file_filter_snapshot().is_empty());
        assert!(store.file_by_id(FileId::new(20)).is_some());
    }

    #[test]
    fn status_starts_idle() {
        let store = DataStore::new();
        store.set_status(Collection::Files, LoadStatus::Loading);
        assert_eq!(store.status(Collection::Rows), LoadStatus::Idle);
        assert_eq!(store.status(Collection::Files), LoadStatus::Loading);
    }
}
