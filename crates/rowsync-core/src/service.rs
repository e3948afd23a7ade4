// ── Remote collaborators ──
//
// The controller talks to the outside world only through these traits.
// `ApiClient` implements all three; tests substitute in-process fakes.
// Every method resolves to domain types, so the reconciler never sees
// wire shapes.

use std::collections::BTreeMap;
use std::future::Future;

use indexmap::IndexMap;
use rowsync_api::ApiClient;

use crate::convert;
use crate::error::CoreError;
use crate::model::{
    AttributeId, AttributeValues, ConnectionPoint, Domain, EntityId, EntityRow, EntityValues,
    FileContainer, FileId, Row, StorageType, TypeEntry, Verdict,
};

/// Entities and attributes.
pub trait RecordService: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;

    fn update_entity(
        &self,
        entity_id: EntityId,
        values: EntityValues,
    ) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;

    fn update_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
        values: AttributeValues,
    ) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;

    fn add_entity(&self) -> impl Future<Output = Result<EntityRow, CoreError>> + Send;

    fn copy_entity(
        &self,
        values: EntityValues,
    ) -> impl Future<Output = Result<EntityRow, CoreError>> + Send;

    fn add_attribute(
        &self,
        entity_id: EntityId,
    ) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;

    fn copy_attribute(
        &self,
        entity_id: EntityId,
        values: AttributeValues,
    ) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;

    fn remove_entity(&self, entity_id: EntityId)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    fn remove_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
    ) -> impl Future<Output = Result<Vec<Row>, CoreError>> + Send;
}

/// Imported provenance files and export.
pub trait FileService: Send + Sync {
    fn list_files(&self) -> impl Future<Output = Result<Vec<FileContainer>, CoreError>> + Send;

    fn remove_file(&self, file_id: FileId) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Render the export document for `selection` (entity id to attribute
    /// ids; empty exports everything).
    fn export(
        &self,
        selection: &BTreeMap<i64, Vec<i64>>,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Check an exported document. A document the service refuses is a
    /// failed [`Verdict`], not an error.
    fn validate(
        &self,
        document: &str,
    ) -> impl Future<Output = Result<Verdict, CoreError>> + Send;
}

/// Lookup data for presenting choices.
pub trait DictionaryService: Send + Sync {
    fn change_types(
        &self,
    ) -> impl Future<Output = Result<IndexMap<String, String>, CoreError>> + Send;

    fn table_types(&self) -> impl Future<Output = Result<Vec<TypeEntry>, CoreError>> + Send;

    fn entity_types(&self) -> impl Future<Output = Result<Vec<TypeEntry>, CoreError>> + Send;

    fn storage_types(&self) -> impl Future<Output = Result<Vec<StorageType>, CoreError>> + Send;

    fn attribute_types(&self) -> impl Future<Output = Result<Vec<TypeEntry>, CoreError>> + Send;

    fn domains(&self) -> impl Future<Output = Result<Vec<Domain>, CoreError>> + Send;

    fn connection_points(
        &self,
    ) -> impl Future<Output = Result<Vec<ConnectionPoint>, CoreError>> + Send;
}

/// Everything a `Controller` needs from its backend.
pub trait Backend: RecordService + FileService + DictionaryService + 'static {}

impl<T: RecordService + FileService + DictionaryService + 'static> Backend for T {}

// ── ApiClient ────────────────────────────────────────────────────────

impl RecordService for ApiClient {
    async fn fetch_all(&self) -> Result<Vec<Row>, CoreError> {
        Ok(convert::rows(self.list_rows().await?))
    }

    async fn update_entity(
        &self,
        entity_id: EntityId,
        values: EntityValues,
    ) -> Result<Vec<Row>, CoreError> {
        let raw = ApiClient::update_entity(self, entity_id.get(), &values.into()).await?;
        Ok(convert::rows(raw))
    }

    async fn update_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
        values: AttributeValues,
    ) -> Result<Vec<Row>, CoreError> {
        let raw = ApiClient::update_attribute(self, entity_id.get(), attribute_id.get(), &values.into())
            .await?;
        Ok(convert::rows(raw))
    }

    async fn add_entity(&self) -> Result<EntityRow, CoreError> {
        Ok(ApiClient::add_entity(self).await?.into())
    }

    async fn copy_entity(&self, values: EntityValues) -> Result<EntityRow, CoreError> {
        Ok(ApiClient::copy_entity(self, &values.into()).await?.into())
    }

    async fn add_attribute(&self, entity_id: EntityId) -> Result<Vec<Row>, CoreError> {
        Ok(convert::rows(ApiClient::add_attribute(self, entity_id.get()).await?))
    }

    async fn copy_attribute(
        &self,
        entity_id: EntityId,
        values: AttributeValues,
    ) -> Result<Vec<Row>, CoreError> {
        let raw = ApiClient::copy_attribute(self, entity_id.get(), &values.into()).await?;
        Ok(convert::rows(raw))
    }

    async fn remove_entity(&self, entity_id: EntityId) -> Result<(), CoreError> {
        Ok(ApiClient::remove_entity(self, entity_id.get()).await?)
    }

    async fn remove_attribute(
        &self,
        entity_id: EntityId,
        attribute_id: AttributeId,
    ) -> Result<Vec<Row>, CoreError> {
        let raw = ApiClient::remove_attribute(self, entity_id.get(), attribute_id.get()).await?;
        Ok(convert::rows(raw))
    }
}

impl FileService for ApiClient {
    async fn list_files(&self) -> Result<Vec<FileContainer>, CoreError> {
        let raw = self.list_containers().await?;
        Ok(raw.into_iter().map(FileContainer::from).collect())
    }

    async fn remove_file(&self, file_id: FileId) -> Result<(), CoreError> {
        Ok(self.remove_container(file_id.get()).await?)
    }

    async fn export(&self, selection: &BTreeMap<i64, Vec<i64>>) -> Result<String, CoreError> {
        Ok(self.export_text(selection).await?)
    }

    async fn validate(&self, document: &str) -> Result<Verdict, CoreError> {
        Ok(self.validate_document(document).await?.into())
    }
}

impl DictionaryService for ApiClient {
    async fn change_types(&self) -> Result<IndexMap<String, String>, CoreError> {
        Ok(ApiClient::change_types(self).await?)
    }

    async fn table_types(&self) -> Result<Vec<TypeEntry>, CoreError> {
        let raw = ApiClient::table_types(self).await?;
        Ok(raw.into_iter().map(TypeEntry::from).collect())
    }

    async fn entity_types(&self) -> Result<Vec<TypeEntry>, CoreError> {
        let raw = ApiClient::entity_types(self).await?;
        Ok(raw.into_iter().map(TypeEntry::from).collect())
    }

    async fn storage_types(&self) -> Result<Vec<StorageType>, CoreError> {
        let raw = ApiClient::storage_types(self).await?;
        Ok(raw.into_iter().map(StorageType::from).collect())
    }

    async fn attribute_types(&self) -> Result<Vec<TypeEntry>, CoreError> {
        let raw = ApiClient::attribute_types(self).await?;
        Ok(raw.into_iter().map(TypeEntry::from).collect())
    }

    async fn domains(&self) -> Result<Vec<Domain>, CoreError> {
        let raw = ApiClient::domains(self).await?;
        Ok(raw.into_iter().map(Domain::from).collect())
    }

    async fn connection_points(&self) -> Result<Vec<ConnectionPoint>, CoreError> {
        let raw = ApiClient::connection_points(self).await?;
        Ok(raw.into_iter().map(ConnectionPoint::from).collect())
    }
}
