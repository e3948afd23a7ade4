#![allow(clippy::unwrap_used)]

// Integration tests for `Controller` against an in-process backend.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;

use rowsync_core::service::{DictionaryService, FileService, RecordService};
use rowsync_core::{
    Attribute, AttributeCells, AttributeField, AttributeId, AttributeValues, Cell, Collection,
    Command, CommandResult, ConnectionPoint, ConsistencyFault, Controller, CoreError, Domain,
    DictionaryKind, EntityCells, EntityField, EntityId, EntityRow, EntityValues, FileContainer,
    FileId, LoadStatus, Row, SessionState, StorageType, TypeEntry, ValidationMessage, Verdict,
};

// ── Fake backend ────────────────────────────────────────────────────

struct Reply {
    result: Result<Vec<Row>, CoreError>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
struct FakeBackend {
    rows: Mutex<Vec<Row>>,
    files: Mutex<Vec<FileContainer>>,
    replies: Mutex<VecDeque<Reply>>,
    created: Mutex<VecDeque<Result<EntityRow, CoreError>>>,
    calls: Mutex<Vec<String>>,
    exported: Mutex<Option<BTreeMap<i64, Vec<i64>>>>,
    validated: Mutex<Vec<String>>,
    verdict: Mutex<Option<Verdict>>,
    fetches: AtomicUsize,
    fail_domains: AtomicBool,
}

impl FakeBackend {
    fn seeded() -> Self {
        let backend = Self::default();
        *backend.rows.lock().unwrap() = seed_rows();
        *backend.files.lock().unwrap() = vec![file(10)];
        backend
    }

    fn reply(&self, result: Result<Vec<Row>, CoreError>) {
        self.replies.lock().unwrap().push_back(Reply { result, gate: None });
    }

    /// Queue a reply held back until the returned sender fires.
    fn gated_reply(&self, rows: Vec<Row>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply {
            result: Ok(rows),
            gate: Some(rx),
        });
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn next_reply(&self, call: String) -> Result<Vec<Row>, CoreError> {
        let reply = {
            self.calls.lock().unwrap().push(call);
            self.replies.lock().unwrap().pop_front()
        };
        let Some(reply) = reply else {
            return Ok(Vec::new());
        };
        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.result
    }
}

impl RecordService for FakeBackend {
    async fn fetch_all(&self) -> Result<Vec<Row>, CoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn update_entity(
        &self,
        entity_id: EntityId,
        values: EntityValues,
    ) -> Result<Vec<Row>, CoreError> {
        let name = values.get(EntityField::EntityName).unwrap_or_default().to_owned();
        self.next_reply(format!("update_entity {entity_id} {name}"))
            .await
    }

    async fn update_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
        values: AttributeValues,
    ) -> Result<Vec<Row>, CoreError> {
        let name = values.get(AttributeField::AttrName).unwrap_or_default().to_owned();
        self.next_reply(format!("update_attribute {entity_id} {attribute_id} {name}"))
            .await
    }

    async fn add_entity(&self) -> Result<EntityRow, CoreError> {
        self.calls.lock().unwrap().push("add_entity".into());
        let next = self.created.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(CoreError::Internal("no entity scripted".into())))
    }

    async fn copy_entity(&self, values: EntityValues) -> Result<EntityRow, CoreError> {
        let name = values.get(EntityField::EntityName).unwrap_or_default().to_owned();
        self.calls.lock().unwrap().push(format!("copy_entity {name}"));
        let next = self.created.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(CoreError::Internal("no entity scripted".into())))
    }

    async fn add_attribute(&self, entity_id: EntityId) -> Result<Vec<Row>, CoreError> {
        self.next_reply(format!("add_attribute {entity_id}")).await
    }

    async fn copy_attribute(
        &self,
        entity_id: EntityId,
        values: AttributeValues,
    ) -> Result<Vec<Row>, CoreError> {
        let name = values.get(AttributeField::AttrName).unwrap_or_default().to_owned();
        self.next_reply(format!("copy_attribute {entity_id} {name}"))
            .await
    }

    async fn remove_entity(&self, entity_id: EntityId) -> Result<(), CoreError> {
        self.next_reply(format!("remove_entity {entity_id}"))
            .await
            .map(|_| ())
    }

    async fn remove_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
    ) -> Result<Vec<Row>, CoreError> {
        self.next_reply(format!("remove_attribute {entity_id} {attribute_id}"))
            .await
    }
}

impl FileService for FakeBackend {
    async fn list_files(&self) -> Result<Vec<FileContainer>, CoreError> {
        Ok(self.files.lock().unwrap().clone())
    }

    async fn remove_file(&self, file_id: FileId) -> Result<(), CoreError> {
        self.next_reply(format!("remove_file {file_id}"))
            .await
            .map(|_| ())
    }

    async fn export(&self, selection: &BTreeMap<i64, Vec<i64>>) -> Result<String, CoreError> {
        *self.exported.lock().unwrap() = Some(selection.clone());
        Ok("CREATE TABLE customers;".into())
    }

    async fn validate(&self, document: &str) -> Result<Verdict, CoreError> {
        self.validated.lock().unwrap().push(document.to_owned());
        let verdict = self.verdict.lock().unwrap().clone();
        Ok(verdict.unwrap_or(Verdict {
            passed: true,
            message: None,
        }))
    }
}

impl DictionaryService for FakeBackend {
    async fn change_types(&self) -> Result<IndexMap<String, String>, CoreError> {
        Ok(IndexMap::from([
            ("NEW".to_owned(), "New".to_owned()),
            ("DELETED".to_owned(), "Deleted".to_owned()),
        ]))
    }

    async fn table_types(&self) -> Result<Vec<TypeEntry>, CoreError> {
        Ok(Vec::new())
    }

    async fn entity_types(&self) -> Result<Vec<TypeEntry>, CoreError> {
        Ok(Vec::new())
    }

    async fn storage_types(&self) -> Result<Vec<StorageType>, CoreError> {
        Ok(Vec::new())
    }

    async fn attribute_types(&self) -> Result<Vec<TypeEntry>, CoreError> {
        Ok(vec![TypeEntry {
            code: "VARCHAR".into(),
            description: "Variable-length text".into(),
        }])
    }

    async fn domains(&self) -> Result<Vec<Domain>, CoreError> {
        if self.fail_domains.load(Ordering::SeqCst) {
            return Err(CoreError::Api {
                message: "metadata service unavailable".into(),
                status: Some(503),
            });
        }
        Ok(Vec::new())
    }

    async fn connection_points(&self) -> Result<Vec<ConnectionPoint>, CoreError> {
        Ok(Vec::new())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn eid(id: i64) -> EntityId {
    EntityId::new(id)
}

fn aid(id: i64) -> AttributeId {
    AttributeId::new(id)
}

fn cell(value: &str) -> Cell {
    Cell::new(Some(value.to_owned()))
}

fn broken(value: &str) -> Cell {
    cell(value).with_messages(vec![ValidationMessage::new("invalid value")])
}

fn entity_row(id: i64, file: Option<i64>, name: &str) -> EntityRow {
    EntityRow {
        id: eid(id),
        file_id: file.map(FileId::new),
        cells: EntityCells {
            entity_name: cell(name),
            ..EntityCells::default()
        },
    }
}

fn attribute(entity: i64, id: i64, name: &str) -> Attribute {
    Attribute {
        id: aid(id),
        entity_id: eid(entity),
        file_id: None,
        cells: AttributeCells {
            attr_name: cell(name),
            ..AttributeCells::default()
        },
    }
}

fn file(id: i64) -> FileContainer {
    FileContainer {
        id: FileId::new(id),
        name: "customers".into(),
        ext: "xlsx".into(),
        full_name: "customers.xlsx".into(),
        created_by: "loader".into(),
        created_at: "2026-10-01 09:00".into(),
        loaded_at: "2026-10-01 09:01".into(),
        modified_at: "2026-10-01 09:01".into(),
        messages: Vec::new(),
    }
}

/// Entity 1 (from file 10) with attributes 11 and 12; entity 2 (manual)
/// with attribute 21.
fn seed_rows() -> Vec<Row> {
    vec![
        Row::Entity(entity_row(1, Some(10), "customers")),
        Row::Attribute(attribute(1, 11, "id")),
        Row::Attribute(attribute(1, 12, "name")),
        Row::Entity(entity_row(2, None, "orders")),
        Row::Attribute(attribute(2, 21, "total")),
    ]
}

async fn loaded(backend: FakeBackend) -> Controller<FakeBackend> {
    let controller = Controller::with_backend(backend, true);
    controller.refresh().await.unwrap();
    controller
}

fn rename(entity: i64, name: &str) -> Command {
    Command::UpdateEntity {
        entity_id: eid(entity),
        field: EntityField::EntityName,
        value: Some(name.to_owned()),
    }
}

// ── Loading ─────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_loads_rows_and_files() {
    let controller = loaded(FakeBackend::seeded()).await;
    let store = controller.store();

    let hierarchy = controller.hierarchy_snapshot();
    assert_eq!(hierarchy.len(), 2);
    assert_eq!(hierarchy.attribute_count(), 3);
    assert_eq!(controller.files_snapshot().len(), 1);
    assert_eq!(store.status(Collection::Rows), LoadStatus::Succeeded);
    assert_eq!(store.status(Collection::Files), LoadStatus::Succeeded);
}

#[tokio::test]
async fn dictionaries_load_despite_one_failure() {
    let backend = FakeBackend::seeded();
    backend.fail_domains.store(true, Ordering::SeqCst);
    let controller = Controller::with_backend(backend, true);

    let failed = controller.load_dictionaries().await.unwrap();

    assert_eq!(failed, vec![DictionaryKind::Domains]);
    let dicts = controller.dictionaries_snapshot();
    assert_eq!(dicts.change_types.len(), 2);
    assert_eq!(dicts.attribute_types[0].code, "VARCHAR");
    assert_eq!(
        controller.store().status(Collection::Dictionaries),
        LoadStatus::Succeeded
    );
}

// ── Field updates ───────────────────────────────────────────────────

#[tokio::test]
async fn entity_update_sends_all_fields_and_overlays_response() {
    let controller = loaded(FakeBackend::seeded()).await;
    let before = controller.hierarchy_snapshot();
    controller
        .backend()
        .reply(Ok(vec![Row::Entity(entity_row(1, Some(10), "clients"))]));

    let result = controller.execute(rename(1, "clients")).await.unwrap();

    assert_eq!(result, CommandResult::Ok);
    assert_eq!(controller.backend().calls(), vec!["update_entity 1 clients"]);
    let after = controller.hierarchy_snapshot();
    let entity = after.entity(eid(1)).unwrap();
    assert_eq!(entity.name(), Some("clients"));
    assert_eq!(entity.attributes.len(), 2);
    assert!(Arc::ptr_eq(
        before.entity(eid(2)).unwrap(),
        after.entity(eid(2)).unwrap()
    ));
}

#[tokio::test]
async fn superseded_update_response_is_discarded() {
    let controller = loaded(FakeBackend::seeded()).await;
    let release = controller
        .backend()
        .gated_reply(vec![Row::Entity(entity_row(1, Some(10), "first"))]);
    controller
        .backend()
        .reply(Ok(vec![Row::Entity(entity_row(1, Some(10), "second"))]));

    let first = controller.execute(rename(1, "first"));
    let second = async {
        let result = controller.execute(rename(1, "second")).await;
        release.send(()).unwrap();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), CommandResult::Discarded);
    assert_eq!(second.unwrap(), CommandResult::Ok);
    let hierarchy = controller.hierarchy_snapshot();
    assert_eq!(hierarchy.entity(eid(1)).unwrap().name(), Some("second"));
}

fn rename_attribute(entity: i64, attribute: i64, name: &str) -> Command {
    Command::UpdateAttribute {
        entity_id: eid(entity),
        attribute_id: aid(attribute),
        field: AttributeField::AttrName,
        value: Some(name.to_owned()),
    }
}

#[tokio::test]
async fn concurrent_edits_on_sibling_attributes_both_apply() {
    let controller = loaded(FakeBackend::seeded()).await;
    let release = controller
        .backend()
        .gated_reply(vec![Row::Attribute(attribute(1, 11, "client_id"))]);
    controller
        .backend()
        .reply(Ok(vec![Row::Attribute(attribute(1, 12, "full_name"))]));

    let first = controller.execute(rename_attribute(1, 11, "client_id"));
    let second = async {
        let result = controller
            .execute(rename_attribute(1, 12, "full_name"))
            .await;
        release.send(()).unwrap();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), CommandResult::Ok);
    assert_eq!(second.unwrap(), CommandResult::Ok);
    let hierarchy = controller.hierarchy_snapshot();
    assert_eq!(
        hierarchy.attribute(eid(1), aid(11)).unwrap().name(),
        Some("client_id")
    );
    assert_eq!(
        hierarchy.attribute(eid(1), aid(12)).unwrap().name(),
        Some("full_name")
    );
}

#[tokio::test]
async fn failed_newer_edit_does_not_discard_older_response() {
    let controller = Controller::with_backend(FakeBackend::seeded(), false);
    controller.refresh().await.unwrap();
    let release = controller
        .backend()
        .gated_reply(vec![Row::Attribute(attribute(1, 11, "client_id"))]);
    controller.backend().reply(Err(CoreError::Api {
        message: "boom".into(),
        status: Some(500),
    }));

    let first = controller.execute(rename_attribute(1, 11, "client_id"));
    let second = async {
        let result = controller.execute(rename_attribute(1, 11, "cid")).await;
        release.send(()).unwrap();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert!(second.is_err());
    assert_eq!(first.unwrap(), CommandResult::Ok);
    let hierarchy = controller.hierarchy_snapshot();
    assert_eq!(
        hierarchy.attribute(eid(1), aid(11)).unwrap().name(),
        Some("client_id")
    );
}

#[tokio::test]
async fn attribute_update_reaches_only_its_attribute() {
    let controller = loaded(FakeBackend::seeded()).await;
    let before = controller.hierarchy_snapshot();
    let mut renamed = attribute(1, 12, "full_name");
    renamed.cells.attr_type = broken("TEXTT");
    controller.backend().reply(Ok(vec![Row::Attribute(renamed)]));

    let result = controller
        .execute(Command::UpdateAttribute {
            entity_id: eid(1),
            attribute_id: aid(12),
            field: AttributeField::AttrName,
            value: Some("full_name".into()),
        })
        .await
        .unwrap();

    assert_eq!(result, CommandResult::Ok);
    let after = controller.hierarchy_snapshot();
    let attr = after.attribute(eid(1), aid(12)).unwrap();
    assert_eq!(attr.name(), Some("full_name"));
    assert!(attr.has_errors());
    assert!(Arc::ptr_eq(
        before.attribute(eid(1), aid(11)).unwrap(),
        after.attribute(eid(1), aid(11)).unwrap()
    ));
}

#[tokio::test]
async fn update_of_unknown_entity_is_not_sent() {
    let controller = loaded(FakeBackend::seeded()).await;

    let err = controller.execute(rename(99, "ghost")).await.unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
    assert!(controller.backend().calls().is_empty());
}

// ── Structural mutations ────────────────────────────────────────────

#[tokio::test]
async fn add_entity_appends_created_row() {
    let controller = loaded(FakeBackend::seeded()).await;
    controller
        .backend()
        .created
        .lock()
        .unwrap()
        .push_back(Ok(entity_row(3, None, "")));

    let result = controller.execute(Command::AddEntity).await.unwrap();

    assert_eq!(result, CommandResult::EntityCreated { entity_id: eid(3) });
    let hierarchy = controller.hierarchy_snapshot();
    assert_eq!(hierarchy.len(), 3);
    assert_eq!(hierarchy.entities()[2].id, eid(3));
}

#[tokio::test]
async fn add_attribute_reports_the_new_id() {
    let controller = loaded(FakeBackend::seeded()).await;
    controller.backend().reply(Ok(vec![
        Row::Entity(entity_row(1, Some(10), "customers")),
        Row::Attribute(attribute(1, 11, "id")),
        Row::Attribute(attribute(1, 12, "name")),
        Row::Attribute(attribute(1, 13, "")),
    ]));

    let result = controller
        .execute(Command::AddAttribute { entity_id: eid(1) })
        .await
        .unwrap();

    assert_eq!(
        result,
        CommandResult::AttributeCreated {
            entity_id: eid(1),
            attribute_id: aid(13)
        }
    );
    let hierarchy = controller.hierarchy_snapshot();
    let ids: Vec<_> = hierarchy
        .entity(eid(1))
        .unwrap()
        .attributes
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![aid(11), aid(12), aid(13)]);
}

#[tokio::test]
async fn copy_attribute_sends_source_values() {
    let controller = loaded(FakeBackend::seeded()).await;
    controller.backend().reply(Ok(vec![
        Row::Attribute(attribute(2, 21, "total")),
        Row::Attribute(attribute(2, 22, "total")),
    ]));

    let result = controller
        .execute(Command::CopyAttribute {
            entity_id: eid(2),
            attribute_id: aid(21),
        })
        .await
        .unwrap();

    assert_eq!(
        result,
        CommandResult::AttributeCreated {
            entity_id: eid(2),
            attribute_id: aid(22)
        }
    );
    assert_eq!(controller.backend().calls(), vec!["copy_attribute 2 total"]);
}

#[tokio::test]
async fn attribute_commands_refused_on_deleted_entity() {
    let backend = FakeBackend::default();
    let mut row = entity_row(1, None, "legacy");
    row.cells.change_type = cell("DELETED");
    *backend.rows.lock().unwrap() = vec![
        Row::Entity(row),
        Row::Attribute(attribute(1, 11, "id")),
    ];
    let controller = loaded(backend).await;

    let add = controller
        .execute(Command::AddAttribute { entity_id: eid(1) })
        .await
        .unwrap_err();
    let copy = controller
        .execute(Command::CopyAttribute {
            entity_id: eid(1),
            attribute_id: aid(11),
        })
        .await
        .unwrap_err();

    assert!(matches!(add, CoreError::Rejected { .. }));
    assert!(matches!(copy, CoreError::Rejected { .. }));
    assert!(controller.backend().calls().is_empty());
}

#[tokio::test]
async fn remove_attribute_drops_it() {
    let controller = loaded(FakeBackend::seeded()).await;
    controller.backend().reply(Ok(vec![
        Row::Entity(entity_row(1, Some(10), "customers")),
        Row::Attribute(attribute(1, 11, "id")),
    ]));

    controller
        .execute(Command::RemoveAttribute {
            entity_id: eid(1),
            attribute_id: aid(12),
        })
        .await
        .unwrap();

    let hierarchy = controller.hierarchy_snapshot();
    assert!(hierarchy.attribute(eid(1), aid(12)).is_none());
    assert_eq!(hierarchy.attribute_count(), 2);
}

#[tokio::test]
async fn remove_entity_drops_it() {
    let controller = loaded(FakeBackend::seeded()).await;

    let result = controller
        .execute(Command::RemoveEntity { entity_id: eid(2) })
        .await
        .unwrap();

    assert_eq!(result, CommandResult::Ok);
    assert!(!controller.hierarchy_snapshot().contains(eid(2)));
    assert_eq!(controller.backend().calls(), vec!["remove_entity 2"]);
}

#[tokio::test]
async fn copy_entity_copies_every_attribute_then_refreshes() {
    let controller = loaded(FakeBackend::seeded()).await;
    let backend = controller.backend();
    backend
        .created
        .lock()
        .unwrap()
        .push_back(Ok(entity_row(5, None, "customers")));
    backend.rows.lock().unwrap().extend([
        Row::Entity(entity_row(5, None, "customers")),
        Row::Attribute(attribute(5, 51, "id")),
        Row::Attribute(attribute(5, 52, "name")),
    ]);

    let result = controller
        .execute(Command::CopyEntity { entity_id: eid(1) })
        .await
        .unwrap();

    assert_eq!(result, CommandResult::EntityCreated { entity_id: eid(5) });
    let mut calls = backend.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "copy_attribute 5 id",
            "copy_attribute 5 name",
            "copy_entity customers"
        ]
    );
    assert_eq!(backend.fetches(), 2);
    assert_eq!(
        controller
            .hierarchy_snapshot()
            .entity(eid(5))
            .unwrap()
            .attributes
            .len(),
        2
    );
}

// ── Files ───────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_file_drops_file_filter_and_entities() {
    let controller = loaded(FakeBackend::seeded()).await;
    let toggled = controller
        .execute(Command::ToggleFileFilter {
            file_id: FileId::new(10),
        })
        .await
        .unwrap();
    assert_eq!(
        toggled,
        CommandResult::FileFilterToggled {
            file_id: FileId::new(10),
            active: true
        }
    );

    controller
        .execute(Command::RemoveFile {
            file_id: FileId::new(10),
        })
        .await
        .unwrap();

    let hierarchy = controller.hierarchy_snapshot();
    assert!(!hierarchy.contains(eid(1)));
    assert!(hierarchy.contains(eid(2)));
    assert!(controller.files_snapshot().is_empty());
    assert!(controller.store().file_filter_snapshot().is_empty());
}

#[tokio::test]
async fn file_filter_limits_visible_entities() {
    let backend = FakeBackend::seeded();
    backend
        .rows
        .lock()
        .unwrap()
        .push(Row::Entity(entity_row(3, Some(30), "invoices")));
    let controller = loaded(backend).await;
    assert_eq!(controller.visible_entities().len(), 3);

    controller
        .execute(Command::ToggleFileFilter {
            file_id: FileId::new(30),
        })
        .await
        .unwrap();

    let visible: Vec<_> = controller.visible_entities().iter().map(|e| e.id).collect();
    assert_eq!(visible, vec![eid(2), eid(3)]);
}

// ── Selection & export ──────────────────────────────────────────────

#[tokio::test]
async fn selection_is_gated_on_field_errors() {
    let backend = FakeBackend::seeded();
    let mut faulty = entity_row(3, None, "");
    faulty.cells.entity_name = broken("");
    let mut bad_attr = attribute(2, 22, "amount");
    bad_attr.cells.attr_size = broken("-1");
    backend
        .rows
        .lock()
        .unwrap()
        .extend([Row::Entity(faulty), Row::Attribute(bad_attr)]);
    let controller = loaded(backend).await;

    let err = controller
        .execute(Command::SelectEntity {
            entity_id: eid(3),
            checked: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }));

    let err = controller
        .execute(Command::SelectAttributes {
            entity_id: eid(2),
            attribute_ids: vec![aid(21), aid(22)],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Rejected { .. }));
    assert!(controller.selection_snapshot().is_empty());

    controller
        .execute(Command::SelectAttributes {
            entity_id: eid(2),
            attribute_ids: vec![aid(21)],
        })
        .await
        .unwrap();
    let selection = controller.selection_snapshot();
    assert!(selection.is_entity_selected(eid(2)));
    assert!(selection.selected_attributes(eid(2)).unwrap().contains(&aid(21)));
}

#[tokio::test]
async fn unchecking_is_never_gated() {
    let controller = loaded(FakeBackend::seeded()).await;

    controller
        .execute(Command::SelectEntity {
            entity_id: eid(99),
            checked: false,
        })
        .await
        .unwrap();

    assert!(controller.selection_snapshot().is_empty());
}

#[tokio::test]
async fn export_sends_live_selection() {
    let controller = loaded(FakeBackend::seeded()).await;
    controller
        .execute(Command::SelectEntity {
            entity_id: eid(1),
            checked: true,
        })
        .await
        .unwrap();
    controller
        .execute(Command::SelectAttributes {
            entity_id: eid(2),
            attribute_ids: vec![aid(21)],
        })
        .await
        .unwrap();
    controller
        .execute(Command::RemoveEntity { entity_id: eid(1) })
        .await
        .unwrap();

    let result = controller.execute(Command::Export).await.unwrap();

    assert_eq!(
        result,
        CommandResult::Exported("CREATE TABLE customers;".into())
    );
    let sent = controller.backend().exported.lock().unwrap().clone().unwrap();
    assert_eq!(sent, BTreeMap::from([(2, vec![21])]));
}

#[tokio::test]
async fn export_is_refused_without_entities() {
    let backend = FakeBackend::default();
    let controller = Controller::with_backend(backend, true);
    controller.refresh().await.unwrap();

    let err = controller.execute(Command::Export).await.unwrap_err();

    assert!(matches!(err, CoreError::Rejected { .. }));
    assert!(controller.backend().exported.lock().unwrap().is_none());
}

#[tokio::test]
async fn validate_sends_the_exported_document() {
    let controller = loaded(FakeBackend::seeded()).await;
    *controller.backend().verdict.lock().unwrap() = Some(Verdict {
        passed: false,
        message: Some("unknown domain FIN".into()),
    });

    let result = controller.execute(Command::Validate).await.unwrap();

    assert_eq!(
        result,
        CommandResult::Validated(Verdict {
            passed: false,
            message: Some("unknown domain FIN".into()),
        })
    );
    assert_eq!(
        *controller.backend().validated.lock().unwrap(),
        vec!["CREATE TABLE customers;".to_owned()]
    );
    let sent = controller.backend().exported.lock().unwrap().clone().unwrap();
    assert!(sent.is_empty());
}

#[tokio::test]
async fn validate_is_refused_without_entities() {
    let controller = Controller::with_backend(FakeBackend::default(), true);
    controller.refresh().await.unwrap();

    let err = controller.execute(Command::Validate).await.unwrap_err();

    assert!(matches!(err, CoreError::Rejected { .. }));
    assert!(controller.backend().validated.lock().unwrap().is_empty());
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_mutation_keeps_hierarchy_and_resyncs() {
    let controller = loaded(FakeBackend::seeded()).await;
    let before = controller.hierarchy_snapshot();
    controller.backend().reply(Err(CoreError::Api {
        message: "boom".into(),
        status: Some(500),
    }));

    let err = controller.execute(rename(1, "clients")).await.unwrap_err();

    assert!(matches!(err, CoreError::Api { .. }));
    assert_eq!(controller.backend().fetches(), 2);
    assert_eq!(*controller.hierarchy_snapshot(), *before);
    assert_eq!(*controller.session_state().borrow(), SessionState::Active);
}

#[tokio::test]
async fn failed_mutation_without_resync_fetches_nothing() {
    let controller = Controller::with_backend(FakeBackend::seeded(), false);
    controller.refresh().await.unwrap();
    controller.backend().reply(Err(CoreError::Api {
        message: "boom".into(),
        status: Some(500),
    }));

    controller.execute(rename(1, "clients")).await.unwrap_err();

    assert_eq!(controller.backend().fetches(), 1);
}

#[tokio::test]
async fn rejected_credentials_terminate_the_session() {
    let controller = loaded(FakeBackend::seeded()).await;
    let mut session = controller.session_state();
    controller
        .backend()
        .reply(Err(CoreError::AuthenticationFailed {
            message: "session expired".into(),
        }));

    let err = controller.execute(rename(1, "clients")).await.unwrap_err();

    assert!(err.is_auth_failure());
    assert!(session.has_changed().unwrap());
    assert_eq!(*session.borrow_and_update(), SessionState::Terminated);
    assert!(controller.is_terminated());
    assert_eq!(controller.backend().fetches(), 1);
}

#[tokio::test]
async fn inconsistent_response_is_reported_and_resynced() {
    let controller = loaded(FakeBackend::seeded()).await;
    let before = controller.hierarchy_snapshot();
    controller.backend().reply(Ok(vec![
        Row::Attribute(attribute(1, 11, "id")),
        Row::Attribute(attribute(1, 12, "name")),
    ]));

    let err = controller
        .execute(Command::AddAttribute { entity_id: eid(1) })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Consistency(ConsistencyFault::NoNewAttribute { .. })
    ));
    assert_eq!(*controller.hierarchy_snapshot(), *before);
    assert_eq!(controller.backend().fetches(), 2);
}
