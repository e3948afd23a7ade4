// ── Runtime connection configuration ──
//
// These types describe *how* to reach the record, dictionary, and
// metadata services. They carry credential data and connection tuning,
// but never touch disk. The CLI constructs a `ControllerConfig` and
// hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// HTTP basic credentials for one service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one record-service deployment.
///
/// Built by the CLI, passed to `Controller`. Core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Record service base URL (e.g., `https://validator.local/api`).
    pub api_url: Url,
    /// Dictionary service base URL. Type dictionaries are skipped without it.
    pub dictionary_url: Option<Url>,
    /// Metadata service base URL. Domains and connection points are
    /// skipped without it.
    pub metadata_url: Option<Url>,
    /// Credentials for the record and metadata services.
    pub credentials: Option<Credentials>,
    /// Credentials for the dictionary service.
    pub dictionary_credentials: Option<Credentials>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Re-fetch rows and files after a failed mutation.
    pub resync_on_failure: bool,
}

impl ControllerConfig {
    /// A config for `api_url` with every other setting at its default.
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            dictionary_url: None,
            metadata_url: None,
            credentials: None,
            dictionary_credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            resync_on_failure: true,
        }
    }
}
