// ── Controller ──
//
// Orchestrates the record, file, and dictionary services against the
// DataStore: loads collections, routes commands, reconciles every
// mutation response into the held hierarchy, and recovers after failed
// requests.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use strum::IntoEnumIterator;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use rowsync_api::transport::{TlsMode, TransportConfig};
use rowsync_api::{ApiClient, ServiceEndpoint};

use crate::command::{Command, CommandResult};
use crate::config::{ControllerConfig, Credentials, TlsVerification};
use crate::error::{ConsistencyFault, CoreError};
use crate::model::{
    AttributeField, AttributeId, Dictionaries, DictionaryKind, Entity, EntityField, EntityId,
    FileContainer, FileId, Hierarchy, Row,
};
use crate::reconcile::Mutation;
use crate::selection::{self, Selection};
use crate::service::Backend;
use crate::store::sequence::{RequestSequencer, Target, Ticket};
use crate::store::{Collection, DataStore, LoadStatus, Publication};

// ── SessionState ─────────────────────────────────────────────────────

/// Whether the services still accept this session's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// A service answered with an authentication failure. Commands are
    /// still routed; they will most likely fail the same way.
    Terminated,
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every operation awaits
/// its service call and reconciles the response before returning, so a
/// caller that awaits a command observes its effect in the next
/// snapshot it reads.
pub struct Controller<B = ApiClient> {
    inner: Arc<ControllerInner<B>>,
}

impl<B> Clone for Controller<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<B> {
    backend: B,
    store: Arc<DataStore>,
    sequencer: RequestSequencer,
    session: watch::Sender<SessionState>,
    resync_on_failure: bool,
}

impl Controller<ApiClient> {
    /// Create a controller talking HTTP to the configured services.
    /// Nothing is fetched until [`refresh()`](Self::refresh) is called.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let client = build_client(&config)?;
        Ok(Self::with_backend(client, config.resync_on_failure))
    }
}

impl<B: Backend> Controller<B> {
    /// Create a controller over any backend.
    ///
    /// With `resync_on_failure`, every failed mutation is followed by a
    /// full reload of rows and files.
    pub fn with_backend(backend: B, resync_on_failure: bool) -> Self {
        let (session, _) = watch::channel(SessionState::Active);
        Self {
            inner: Arc::new(ControllerInner {
                backend,
                store: Arc::new(DataStore::new()),
                sequencer: RequestSequencer::new(),
                session,
                resync_on_failure,
            }),
        }
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Access the backend the controller routes requests to.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Reload rows and files concurrently.
    ///
    /// On failure the previously held data stays in place.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let (rows, files) = tokio::join!(self.refresh_rows(), self.refresh_files());
        rows.and(files)
    }

    /// Replace the hierarchy with the service's full row set.
    pub async fn refresh_rows(&self) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.set_status(Collection::Rows, LoadStatus::Loading);

        let result = match self.inner.backend.fetch_all().await {
            Ok(rows) => store
                .apply(Mutation::Refresh, rows)
                .map_err(CoreError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => {
                store.set_status(Collection::Rows, LoadStatus::Succeeded);
                let hierarchy = store.hierarchy_snapshot();
                info!(
                    entities = hierarchy.len(),
                    attributes = hierarchy.attribute_count(),
                    "rows refreshed"
                );
                Ok(())
            }
            Err(e) => {
                store.set_status(Collection::Rows, LoadStatus::Idle);
                self.note_failure(&e);
                warn!(error = %e, "row refresh failed");
                Err(e)
            }
        }
    }

    /// Replace the provenance file list.
    pub async fn refresh_files(&self) -> Result<(), CoreError> {
        let store = &self.inner.store;
        store.set_status(Collection::Files, LoadStatus::Loading);

        match self.inner.backend.list_files().await {
            Ok(files) => {
                let count = files.len();
                store.replace_files(files);
                store.set_status(Collection::Files, LoadStatus::Succeeded);
                debug!(files = count, "files refreshed");
                Ok(())
            }
            Err(e) => {
                store.set_status(Collection::Files, LoadStatus::Idle);
                self.note_failure(&e);
                warn!(error = %e, "file refresh failed");
                Err(e)
            }
        }
    }

    /// Load every dictionary concurrently.
    ///
    /// Each dictionary that arrives is stored; the others keep their
    /// previous contents. Returns the kinds that failed, or the first
    /// error when none could be loaded.
    pub async fn load_dictionaries(&self) -> Result<Vec<DictionaryKind>, CoreError> {
        let store = &self.inner.store;
        let backend = &self.inner.backend;
        store.set_status(Collection::Dictionaries, LoadStatus::Loading);

        let (
            change_types,
            table_types,
            entity_types,
            storage_types,
            attribute_types,
            domains,
            connection_points,
        ) = tokio::join!(
            backend.change_types(),
            backend.table_types(),
            backend.entity_types(),
            backend.storage_types(),
            backend.attribute_types(),
            backend.domains(),
            backend.connection_points(),
        );

        let mut failures = Vec::new();
        let change_types = settle(DictionaryKind::ChangeTypes, change_types, &mut failures);
        let table_types = settle(DictionaryKind::TableTypes, table_types, &mut failures);
        let entity_types = settle(DictionaryKind::EntityTypes, entity_types, &mut failures);
        let storage_types = settle(DictionaryKind::StorageTypes, storage_types, &mut failures);
        let attribute_types =
            settle(DictionaryKind::AttributeTypes, attribute_types, &mut failures);
        let domains = settle(DictionaryKind::Domains, domains, &mut failures);
        let connection_points = settle(
            DictionaryKind::ConnectionPoints,
            connection_points,
            &mut failures,
        );

        for (_, e) in &failures {
            self.note_failure(e);
        }

        if failures.len() == DictionaryKind::iter().count() {
            store.set_status(Collection::Dictionaries, LoadStatus::Idle);
            let mut failures = failures.into_iter();
            return Err(failures.next().map_or_else(
                || CoreError::Internal("no dictionary loaded".into()),
                |(_, e)| e,
            ));
        }

        store.update_dictionaries(|dicts| {
            if let Some(v) = change_types {
                dicts.change_types = v;
            }
            if let Some(v) = table_types {
                dicts.table_types = v;
            }
            if let Some(v) = entity_types {
                dicts.entity_types = v;
            }
            if let Some(v) = storage_types {
                dicts.storage_types = v;
            }
            if let Some(v) = attribute_types {
                dicts.attribute_types = v;
            }
            if let Some(v) = domains {
                dicts.domains = v;
            }
            if let Some(v) = connection_points {
                dicts.connection_points = v;
            }
        });
        store.set_status(Collection::Dictionaries, LoadStatus::Succeeded);
        debug!(failed = failures.len(), "dictionaries loaded");

        Ok(failures.into_iter().map(|(kind, _)| kind).collect())
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command, returning once its response has been
    /// reconciled and published.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        debug!(?cmd, "executing command");
        match cmd {
            Command::UpdateEntity {
                entity_id,
                field,
                value,
            } => self.update_entity(entity_id, field, value).await,
            Command::AddEntity => self.add_entity().await,
            Command::CopyEntity { entity_id } => self.copy_entity(entity_id).await,
            Command::RemoveEntity { entity_id } => self.remove_entity(entity_id).await,
            Command::UpdateAttribute {
                entity_id,
                attribute_id,
                field,
                value,
            } => {
                self.update_attribute(entity_id, attribute_id, field, value)
                    .await
            }
            Command::AddAttribute { entity_id } => self.add_attribute(entity_id).await,
            Command::CopyAttribute {
                entity_id,
                attribute_id,
            } => self.copy_attribute(entity_id, attribute_id).await,
            Command::RemoveAttribute {
                entity_id,
                attribute_id,
            } => self.remove_attribute(entity_id, attribute_id).await,
            Command::RemoveFile { file_id } => self.remove_file(file_id).await,
            Command::ToggleFileFilter { file_id } => {
                let active = self.inner.store.toggle_file(file_id);
                Ok(CommandResult::FileFilterToggled { file_id, active })
            }
            Command::SelectEntity { entity_id, checked } => {
                self.select_entity(entity_id, checked)
            }
            Command::SelectAttributes {
                entity_id,
                attribute_ids,
            } => self.select_attributes(entity_id, attribute_ids),
            Command::Export => self.export().await.map(CommandResult::Exported),
            Command::Validate => self.validate().await,
        }
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to session state changes.
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    pub fn is_terminated(&self) -> bool {
        *self.inner.session.borrow() == SessionState::Terminated
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────────

    pub fn hierarchy_snapshot(&self) -> Arc<Hierarchy> {
        self.inner.store.hierarchy_snapshot()
    }

    pub fn selection_snapshot(&self) -> Arc<Selection> {
        self.inner.store.selection_snapshot()
    }

    pub fn files_snapshot(&self) -> Arc<Vec<Arc<FileContainer>>> {
        self.inner.store.files_snapshot()
    }

    pub fn dictionaries_snapshot(&self) -> Arc<Dictionaries> {
        self.inner.store.dictionaries_snapshot()
    }

    /// Entities shown under the current file filter.
    pub fn visible_entities(&self) -> Vec<Arc<Entity>> {
        self.inner.store.visible_entities()
    }
}

// ── Command routing ──────────────────────────────────────────────────

impl<B: Backend> Controller<B> {
    // ── Entity operations ────────────────────────────────────────────

    async fn update_entity(
        &self,
        entity_id: EntityId,
        field: EntityField,
        value: Option<String>,
    ) -> Result<CommandResult, CoreError> {
        let entity = self.entity(entity_id)?;
        let values = entity.cells.values().with(field, value);

        let ticket = self.inner.sequencer.issue(Target::entity(entity_id));
        let rows = self
            .remote(self.inner.backend.update_entity(entity_id, values))
            .await?;

        let result = self
            .reconcile_update(ticket, Mutation::UpdateEntity { entity_id }, rows)
            .await?;
        if result == CommandResult::Discarded {
            debug!(%entity_id, %field, "entity update not applied");
        }
        Ok(result)
    }

    async fn add_entity(&self) -> Result<CommandResult, CoreError> {
        let row = self.remote(self.inner.backend.add_entity()).await?;
        let entity_id = row.id;
        self.reconcile(Mutation::AddEntity, vec![Row::Entity(row)])
            .await?;
        info!(%entity_id, "entity created");
        Ok(CommandResult::EntityCreated { entity_id })
    }

    async fn copy_entity(&self, source_id: EntityId) -> Result<CommandResult, CoreError> {
        let source = self.entity(source_id)?;
        let row = self
            .remote(self.inner.backend.copy_entity(source.cells.values()))
            .await?;
        let entity_id = row.id;
        info!(
            source = %source_id,
            %entity_id,
            attributes = source.attributes.len(),
            "copying entity"
        );

        let backend = &self.inner.backend;
        let copies = source
            .attributes
            .iter()
            .map(|attr| backend.copy_attribute(entity_id, attr.cells.values()));
        self.remote(async {
            join_all(copies)
                .await
                .into_iter()
                .collect::<Result<Vec<_>, _>>()
        })
        .await?;

        // The copy and its attributes arrived as separate row sets; one
        // refresh yields the settled state.
        self.refresh_rows().await?;
        Ok(CommandResult::EntityCreated { entity_id })
    }

    async fn remove_entity(&self, entity_id: EntityId) -> Result<CommandResult, CoreError> {
        self.entity(entity_id)?;
        self.remote(self.inner.backend.remove_entity(entity_id))
            .await?;
        self.inner.sequencer.forget(entity_id);
        let result = self
            .reconcile(Mutation::RemoveEntity { entity_id }, Vec::new())
            .await
            .map(plain_result)?;
        info!(%entity_id, "entity removed");
        Ok(result)
    }

    // ── Attribute operations ─────────────────────────────────────────

    async fn update_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
        field: AttributeField,
        value: Option<String>,
    ) -> Result<CommandResult, CoreError> {
        let entity = self.entity(entity_id)?;
        let attribute = entity
            .attribute(attribute_id)
            .ok_or_else(|| CoreError::attribute_not_found(entity_id, attribute_id))?;
        let values = attribute.cells.values().with(field, value);

        let ticket = self
            .inner
            .sequencer
            .issue(Target::attribute(entity_id, attribute_id));
        let rows = self
            .remote(
                self.inner
                    .backend
                    .update_attribute(entity_id, attribute_id, values),
            )
            .await?;

        let mutation = Mutation::UpdateAttribute {
            entity_id,
            attribute_id,
        };
        let result = self.reconcile_update(ticket, mutation, rows).await?;
        if result == CommandResult::Discarded {
            debug!(%entity_id, %attribute_id, %field, "attribute update not applied");
        }
        Ok(result)
    }

    async fn add_attribute(&self, entity_id: EntityId) -> Result<CommandResult, CoreError> {
        let entity = self.entity(entity_id)?;
        reject_deleted(&entity)?;

        self.inner.sequencer.restructure(entity_id);
        let rows = self
            .remote(self.inner.backend.add_attribute(entity_id))
            .await?;
        let publication = self
            .reconcile(Mutation::AddAttribute { entity_id }, rows)
            .await?;
        Ok(created_result(entity_id, publication))
    }

    async fn copy_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
    ) -> Result<CommandResult, CoreError> {
        let entity = self.entity(entity_id)?;
        reject_deleted(&entity)?;
        let source = entity
            .attribute(attribute_id)
            .ok_or_else(|| CoreError::attribute_not_found(entity_id, attribute_id))?;
        let values = source.cells.values();

        self.inner.sequencer.restructure(entity_id);
        let rows = self
            .remote(self.inner.backend.copy_attribute(entity_id, values))
            .await?;
        let publication = self
            .reconcile(Mutation::CopyAttribute { entity_id }, rows)
            .await?;
        Ok(created_result(entity_id, publication))
    }

    async fn remove_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
    ) -> Result<CommandResult, CoreError> {
        self.entity(entity_id)?;

        self.inner.sequencer.restructure(entity_id);
        let rows = self
            .remote(
                self.inner
                    .backend
                    .remove_attribute(entity_id, attribute_id),
            )
            .await?;
        self.reconcile(
            Mutation::RemoveAttribute {
                entity_id,
                attribute_id,
            },
            rows,
        )
        .await
        .map(plain_result)
    }

    // ── Provenance files ─────────────────────────────────────────────

    async fn remove_file(&self, file_id: FileId) -> Result<CommandResult, CoreError> {
        self.remote(self.inner.backend.remove_file(file_id)).await?;
        self.inner.store.drop_file(file_id);
        let result = self
            .reconcile(Mutation::RemoveFile { file_id }, Vec::new())
            .await
            .map(plain_result)?;
        info!(%file_id, "file removed");
        Ok(result)
    }

    // ── Selection & export ───────────────────────────────────────────

    fn select_entity(&self, entity_id: EntityId, checked: bool) -> Result<CommandResult, CoreError> {
        if checked {
            let entity = self.entity(entity_id)?;
            if !selection::entity_selectable(&entity) {
                return Err(CoreError::rejected(format!(
                    "entity {entity_id} has field errors and cannot be selected"
                )));
            }
        }
        self.inner
            .store
            .update_selection(|sel| sel.set_entity_selected(entity_id, checked));
        Ok(CommandResult::Ok)
    }

    fn select_attributes(
        &self,
        entity_id: EntityId,
        attribute_ids: Vec<AttributeId>,
    ) -> Result<CommandResult, CoreError> {
        let entity = self.entity(entity_id)?;
        let current = self.inner.store.selection_snapshot();
        let already = current.selected_attributes(entity_id);

        // Ids that stay selected are not re-checked; their errors may have
        // appeared after they were picked.
        for &attribute_id in &attribute_ids {
            if already.is_some_and(|ids| ids.contains(&attribute_id)) {
                continue;
            }
            let attribute = entity
                .attribute(attribute_id)
                .ok_or_else(|| CoreError::attribute_not_found(entity_id, attribute_id))?;
            if !selection::attribute_selectable(&entity, attribute) {
                return Err(CoreError::rejected(format!(
                    "attribute {attribute_id} of entity {entity_id} cannot be selected \
                     while it or its entity has field errors"
                )));
            }
        }

        self.inner
            .store
            .update_selection(|sel| sel.set_selected_attribute_ids(entity_id, attribute_ids));
        Ok(CommandResult::Ok)
    }

    /// Refused while no entities are loaded.
    async fn export(&self) -> Result<String, CoreError> {
        let store = &self.inner.store;
        let hierarchy = store.hierarchy_snapshot();
        if hierarchy.is_empty() {
            return Err(CoreError::rejected("no entities are loaded"));
        }
        let payload = store.selection_snapshot().export_payload(&hierarchy);
        debug!(entities = payload.len(), "exporting selection");
        self.remote(self.inner.backend.export(&payload)).await
    }

    async fn validate(&self) -> Result<CommandResult, CoreError> {
        let document = self.export().await?;
        let verdict = self.remote(self.inner.backend.validate(&document)).await?;
        info!(passed = verdict.passed, "document validated");
        Ok(CommandResult::Validated(verdict))
    }
}

// ── Failure handling ─────────────────────────────────────────────────

impl<B: Backend> Controller<B> {
    fn entity(&self, id: EntityId) -> Result<Arc<Entity>, CoreError> {
        self.inner
            .store
            .entity_by_id(id)
            .ok_or_else(|| CoreError::entity_not_found(id))
    }

    /// Await a service call, recovering when it fails.
    async fn remote<T>(
        &self,
        call: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        match call.await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "service request failed");
                self.recover(&e).await;
                Err(e)
            }
        }
    }

    /// Reconcile a mutation response; a consistency fault leaves the
    /// hierarchy untouched and is recovered like a failed request.
    async fn reconcile(&self, mutation: Mutation, rows: Vec<Row>) -> Result<Publication, CoreError> {
        let applied = self.inner.store.apply(mutation, rows);
        self.settle_fault(mutation, applied).await
    }

    /// Reconcile a field-update response unless a newer response for the
    /// same record, or a structural change of its entity, got there first.
    async fn reconcile_update(
        &self,
        ticket: Ticket,
        mutation: Mutation,
        rows: Vec<Row>,
    ) -> Result<CommandResult, CoreError> {
        let store = &self.inner.store;
        match self
            .inner
            .sequencer
            .apply_if_current(ticket, || store.apply(mutation, rows))
        {
            Some(applied) => self.settle_fault(mutation, applied).await.map(plain_result),
            None => Ok(CommandResult::Discarded),
        }
    }

    async fn settle_fault(
        &self,
        mutation: Mutation,
        applied: Result<Publication, ConsistencyFault>,
    ) -> Result<Publication, CoreError> {
        match applied {
            Ok(publication) => Ok(publication),
            Err(fault) => {
                warn!(?mutation, %fault, "response could not be reconciled");
                let e = CoreError::from(fault);
                self.recover(&e).await;
                Err(e)
            }
        }
    }

    async fn recover(&self, error: &CoreError) {
        if error.is_auth_failure() {
            self.terminate_session();
            return;
        }
        if !self.inner.resync_on_failure {
            return;
        }
        debug!("resyncing after failure");
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "resync after failure failed");
        }
    }

    fn note_failure(&self, error: &CoreError) {
        if error.is_auth_failure() {
            self.terminate_session();
        }
    }

    fn terminate_session(&self) {
        let previous = self.inner.session.send_replace(SessionState::Terminated);
        if previous == SessionState::Active {
            warn!("credentials rejected, session terminated");
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn settle<T>(
    kind: DictionaryKind,
    result: Result<T, CoreError>,
    failures: &mut Vec<(DictionaryKind, CoreError)>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(dictionary = %kind, error = %e, "dictionary load failed");
            failures.push((kind, e));
            None
        }
    }
}

fn plain_result(publication: Publication) -> CommandResult {
    match publication {
        Publication::Published { .. } => CommandResult::Ok,
        Publication::Stale => CommandResult::Discarded,
    }
}

fn created_result(entity_id: EntityId, publication: Publication) -> CommandResult {
    match publication {
        Publication::Published {
            appended: Some(attribute_id),
        } => {
            info!(%entity_id, %attribute_id, "attribute created");
            CommandResult::AttributeCreated {
                entity_id,
                attribute_id,
            }
        }
        other => plain_result(other),
    }
}

fn reject_deleted(entity: &Entity) -> Result<(), CoreError> {
    if entity.is_deleted() {
        return Err(CoreError::rejected(format!(
            "entity {} is marked for deletion",
            entity.id
        )));
    }
    Ok(())
}

/// Build an [`ApiClient`] from the controller configuration.
fn build_client(config: &ControllerConfig) -> Result<ApiClient, CoreError> {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    };
    let records = endpoint(config.api_url.clone(), config.credentials.as_ref());
    let dictionaries = config
        .dictionary_url
        .clone()
        .map(|url| endpoint(url, config.dictionary_credentials.as_ref()));
    let metadata = config
        .metadata_url
        .clone()
        .map(|url| endpoint(url, config.credentials.as_ref()));

    Ok(ApiClient::new(records, dictionaries, metadata, &transport)?)
}

fn endpoint(url: url::Url, credentials: Option<&Credentials>) -> ServiceEndpoint {
    let endpoint = ServiceEndpoint::new(url);
    match credentials {
        Some(c) => endpoint.with_credentials(c.username.clone(), c.password.clone()),
        None => endpoint,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
