// Record service endpoints: imported files and export. Document
// validation lives on the metadata service.

use std::collections::BTreeMap;

use reqwest::Method;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::models::{
    ContainersEnvelope, DocumentVerdict, RawContainer, RawValidationReply,
};

impl ApiClient {
    /// `GET /containers`
    pub async fn list_containers(&self) -> Result<Vec<RawContainer>, Error> {
        let envelope: ContainersEnvelope = self
            .send_json(Service::Records, Method::GET, "containers", None::<&()>)
            .await?;
        Ok(envelope.containers)
    }

    /// Delete an imported file. The service drops every row it produced.
    ///
    /// `DELETE /container/{file_id}`
    pub async fn remove_container(&self, file_id: i64) -> Result<(), Error> {
        self.send_empty(Service::Records, Method::DELETE, &format!("container/{file_id}"))
            .await
    }

    /// Render the export document for a selection.
    ///
    /// The selection maps entity ids to the attribute ids picked within
    /// them; an empty map exports everything.
    ///
    /// `POST /download/text`
    pub async fn export_text(&self, selection: &BTreeMap<i64, Vec<i64>>) -> Result<String, Error> {
        self.send_text(Service::Records, Method::POST, "download/text", Some(selection))
            .await
    }

    /// Check an exported document against the metadata service.
    ///
    /// A 4xx reply is the service rejecting the document and yields a
    /// failed verdict carrying its message; every other failure is an
    /// error.
    ///
    /// `POST /svc/mdc/yaml/validate` (`text/plain` body)
    pub async fn validate_document(&self, document: &str) -> Result<DocumentVerdict, Error> {
        let result = self
            .send_plain(
                Service::Metadata,
                Method::POST,
                "svc/mdc/yaml/validate",
                document.to_owned(),
            )
            .await;

        match result {
            Ok(body) => Ok(DocumentVerdict {
                passed: true,
                message: reply_message(&body),
            }),
            Err(Error::Status { status, message }) if (400..500).contains(&status) => {
                Ok(DocumentVerdict {
                    passed: false,
                    message: reply_message(&message)
                        .or_else(|| Some(message).filter(|m| !m.is_empty())),
                })
            }
            Err(e) => Err(e),
        }
    }
}

fn reply_message(body: &str) -> Option<String> {
    serde_json::from_str::<RawValidationReply>(body)
        .ok()
        .and_then(|reply| reply.message)
        .filter(|m| !m.is_empty())
}
