// Record service endpoints: entities and attributes.
//
// Every mutation except entity creation and removal answers with a flat
// row-set; the caller reconciles it into its held hierarchy.

use reqwest::Method;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::models::{AttributeBody, EntityBody, RawEntity, RawRow, RowsEnvelope};

const NO_BODY: Option<&()> = None;

impl ApiClient {
    /// Fetch every entity and attribute row.
    ///
    /// `GET /entities`
    pub async fn list_rows(&self) -> Result<Vec<RawRow>, Error> {
        let envelope: RowsEnvelope = self
            .send_json(Service::Records, Method::GET, "entities", NO_BODY)
            .await?;
        Ok(envelope.rows)
    }

    /// Replace an entity's field values; answers with the revalidated
    /// entity row and any attribute rows whose validation changed.
    ///
    /// `PUT /entity/{entity_id}`
    pub async fn update_entity(&self, entity_id: i64, body: &EntityBody) -> Result<Vec<RawRow>, Error> {
        self.send_json(
            Service::Records,
            Method::PUT,
            &format!("entity/{entity_id}"),
            Some(body),
        )
        .await
    }

    /// Replace an attribute's field values.
    ///
    /// `PUT /entity/{entity_id}/attribute/{attribute_id}`
    pub async fn update_attribute(
        &self,
        entity_id: i64,
        attribute_id: i64,
        body: &AttributeBody,
    ) -> Result<Vec<RawRow>, Error> {
        self.send_json(
            Service::Records,
            Method::PUT,
            &format!("entity/{entity_id}/attribute/{attribute_id}"),
            Some(body),
        )
        .await
    }

    /// Create a blank entity.
    ///
    /// `POST /entity`
    pub async fn add_entity(&self) -> Result<RawEntity, Error> {
        self.send_json(Service::Records, Method::POST, "entity", NO_BODY)
            .await
    }

    /// Create an entity pre-filled with the given values.
    ///
    /// `POST /entity` with a body
    pub async fn copy_entity(&self, body: &EntityBody) -> Result<RawEntity, Error> {
        self.send_json(Service::Records, Method::POST, "entity", Some(body))
            .await
    }

    /// Append a blank attribute; answers with the entity row and its full
    /// attribute set.
    ///
    /// `POST /entity/{entity_id}/attribute`
    pub async fn add_attribute(&self, entity_id: i64) -> Result<Vec<RawRow>, Error> {
        self.send_json(
            Service::Records,
            Method::POST,
            &format!("entity/{entity_id}/attribute"),
            NO_BODY,
        )
        .await
    }

    /// Append an attribute pre-filled with the given values.
    ///
    /// `POST /entity/{entity_id}/attribute` with a body
    pub async fn copy_attribute(&self, entity_id: i64, body: &AttributeBody) -> Result<Vec<RawRow>, Error> {
        self.send_json(
            Service::Records,
            Method::POST,
            &format!("entity/{entity_id}/attribute"),
            Some(body),
        )
        .await
    }

    /// `DELETE /entity/{entity_id}`
    pub async fn remove_entity(&self, entity_id: i64) -> Result<(), Error> {
        self.send_empty(Service::Records, Method::DELETE, &format!("entity/{entity_id}"))
            .await
    }

    /// Remove an attribute; answers with the revalidated entity row.
    ///
    /// `DELETE /entity/{entity_id}/attribute/{attribute_id}`
    pub async fn remove_attribute(&self, entity_id: i64, attribute_id: i64) -> Result<Vec<RawRow>, Error> {
        self.send_json(
            Service::Records,
            Method::DELETE,
            &format!("entity/{entity_id}/attribute/{attribute_id}"),
            NO_BODY,
        )
        .await
    }
}
