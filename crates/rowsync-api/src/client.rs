// HTTP client for the record, dictionary, and metadata services
//
// Wraps `reqwest::Client` with per-service base URLs, basic credentials,
// status-to-error mapping, and JSON decoding. Endpoint groups (rows,
// containers, dictionaries) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP basic credentials for one service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Base URL plus optional credentials of one remote service.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub base_url: Url,
    pub credentials: Option<Credentials>,
}

impl ServiceEndpoint {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password,
        });
        self
    }
}

/// Which backing service a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Service {
    /// Entities, attributes, containers, export.
    Records,
    /// Attribute/entity/storage/table type dictionaries.
    Dictionaries,
    /// Domains and connection points.
    Metadata,
}

impl Service {
    fn name(self) -> &'static str {
        match self {
            Self::Records => "record",
            Self::Dictionaries => "dictionary",
            Self::Metadata => "metadata",
        }
    }
}

/// Raw HTTP client for the validation backend.
///
/// The record service is mandatory; the dictionary and metadata services
/// are optional and only needed for lookup data.
pub struct ApiClient {
    http: reqwest::Client,
    records: ServiceEndpoint,
    dictionaries: Option<ServiceEndpoint>,
    metadata: Option<ServiceEndpoint>,
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        records: ServiceEndpoint,
        dictionaries: Option<ServiceEndpoint>,
        metadata: Option<ServiceEndpoint>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let client = Self::with_client(http, records, dictionaries, metadata);
        Ok(client.with_timeout(transport.timeout))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        records: ServiceEndpoint,
        dictionaries: Option<ServiceEndpoint>,
        metadata: Option<ServiceEndpoint>,
    ) -> Self {
        Self {
            http,
            records,
            dictionaries,
            metadata,
            timeout: None,
        }
    }

    /// Record the timeout the underlying client was built with, so timed
    /// out requests can report it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The record service base URL.
    pub fn base_url(&self) -> &Url {
        &self.records.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn endpoint(&self, service: Service) -> Result<&ServiceEndpoint, Error> {
        match service {
            Service::Records => Some(&self.records),
            Service::Dictionaries => self.dictionaries.as_ref(),
            Service::Metadata => self.metadata.as_ref(),
        }
        .ok_or(Error::Unconfigured {
            service: service.name(),
        })
    }

    /// Build `{base}/{path}` for a service, tolerating trailing slashes.
    pub(crate) fn url(&self, service: Service, path: &str) -> Result<Url, Error> {
        let endpoint = self.endpoint(service)?;
        let base = endpoint.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, service: Service, method: Method, url: Url) -> Result<reqwest::RequestBuilder, Error> {
        let builder = self.http.request(method, url);
        Ok(match &self.endpoint(service)?.credentials {
            Some(creds) => builder.basic_auth(&creds.username, Some(creds.password.expose_secret())),
            None => builder,
        })
    }

    /// Send a request and decode the JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        service: Service,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        let text = self.send_text(service, method, path, body).await?;
        decode(&text)
    }

    /// Send a request and return the raw response body.
    pub(crate) async fn send_text(
        &self,
        service: Service,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<String, Error> {
        let url = self.url(service, path)?;
        debug!("{} {}", method, url);

        let mut builder = self.request(service, method, url)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.read_text(builder).await
    }

    /// Send a `text/plain` body and return the raw response body.
    pub(crate) async fn send_plain(
        &self,
        service: Service,
        method: Method,
        path: &str,
        body: String,
    ) -> Result<String, Error> {
        let url = self.url(service, path)?;
        debug!("{} {} ({} bytes)", method, url, body.len());

        let builder = self
            .request(service, method, url)?
            .header(CONTENT_TYPE, "text/plain")
            .body(body);
        self.read_text(builder).await
    }

    async fn read_text(&self, builder: reqwest::RequestBuilder) -> Result<String, Error> {
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let resp = check_status(resp).await?;
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(body = %preview(&text), "response body");
        Ok(text)
    }

    /// Send a request whose response body is ignored.
    pub(crate) async fn send_empty(
        &self,
        service: Service,
        method: Method,
        path: &str,
    ) -> Result<(), Error> {
        let url = self.url(service, path)?;
        debug!("{} {}", method, url);

        let resp = self
            .request(service, method, url)?
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(resp).await?;
        Ok(())
    }

    /// A client-side timeout becomes [`Error::Timeout`] when the configured
    /// timeout is known.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}

/// Map non-success statuses onto the error taxonomy.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_owned();
    let body = resp.text().await.unwrap_or_default();
    let message = preview(&body);

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Authentication {
            message: if message.is_empty() {
                "credentials rejected".into()
            } else {
                message
            },
        },
        StatusCode::FORBIDDEN => Error::Forbidden { message },
        StatusCode::NOT_FOUND => Error::NotFound { path },
        other => Error::Status {
            status: other.as_u16(),
            message,
        },
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
