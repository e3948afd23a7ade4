// Lookup data: change types on the record service, type dictionaries on
// the dictionary service, domains and connection points on the metadata
// service.

use indexmap::IndexMap;
use reqwest::Method;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::models::{
    ChangeTypesEnvelope, RawAttributeType, RawConnectionPoint, RawDomain, RawEntityType,
    RawStorageType, RawTableType,
};

const NO_BODY: Option<&()> = None;

impl ApiClient {
    /// Change-type codes mapped to display labels.
    ///
    /// `GET /dict/changetypes`
    pub async fn change_types(&self) -> Result<IndexMap<String, String>, Error> {
        let envelope: ChangeTypesEnvelope = self
            .send_json(Service::Records, Method::GET, "dict/changetypes", NO_BODY)
            .await?;
        Ok(envelope.change_types)
    }

    pub async fn attribute_types(&self) -> Result<Vec<RawAttributeType>, Error> {
        self.send_json(
            Service::Dictionaries,
            Method::GET,
            "api/eiap/bum/dictattributegeneraltype",
            NO_BODY,
        )
        .await
    }

    pub async fn entity_types(&self) -> Result<Vec<RawEntityType>, Error> {
        self.send_json(
            Service::Dictionaries,
            Method::GET,
            "api/eiap/bum/dictentitytype",
            NO_BODY,
        )
        .await
    }

    pub async fn storage_types(&self) -> Result<Vec<RawStorageType>, Error> {
        self.send_json(
            Service::Dictionaries,
            Method::GET,
            "api/eiap/bum/dictentitystoragetype",
            NO_BODY,
        )
        .await
    }

    pub async fn table_types(&self) -> Result<Vec<RawTableType>, Error> {
        self.send_json(
            Service::Dictionaries,
            Method::GET,
            "api/eiap/bum/dicttabletype",
            NO_BODY,
        )
        .await
    }

    pub async fn domains(&self) -> Result<Vec<RawDomain>, Error> {
        self.send_json(Service::Metadata, Method::GET, "svc/mdc/domains", NO_BODY)
            .await
    }

    pub async fn connection_points(&self) -> Result<Vec<RawConnectionPoint>, Error> {
        self.send_json(
            Service::Metadata,
            Method::GET,
            "svc/mdc/connection-points",
            NO_BODY,
        )
        .await
    }
}
