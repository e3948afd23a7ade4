// ── Core error types ──
//
// User-facing errors from rowsync-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<rowsync_api::Error>`
// impl translates transport-layer errors into domain variants.
//
// Field validation errors are NOT errors in this sense. They live inside
// cells as data and flow through the hierarchy like any other value.

use thiserror::Error;

use crate::model::{AttributeId, EntityId};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// Refused locally before reaching the service.
    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    /// A service response could not be merged into the held hierarchy.
    #[error("Inconsistent service response: {0}")]
    Consistency(#[from] ConsistencyFault),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn entity_not_found(id: EntityId) -> Self {
        Self::NotFound {
            entity_type: "entity".into(),
            identifier: id.to_string(),
        }
    }

    pub(crate) fn attribute_not_found(entity_id: EntityId, attribute_id: AttributeId) -> Self {
        Self::NotFound {
            entity_type: "attribute".into(),
            identifier: format!("{attribute_id} (entity {entity_id})"),
        }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// True when the service rejected the session's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

/// A response that violates the reconciler's expectations.
///
/// These indicate a defect on one side of the wire. They are reported
/// and logged; the held hierarchy is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyFault {
    #[error("entity {entity_id}: response carries no attribute absent from the held entity")]
    NoNewAttribute { entity_id: EntityId },

    #[error("entity {entity_id}: response carries several unknown attributes {candidates:?}")]
    AmbiguousNewAttribute {
        entity_id: EntityId,
        candidates: Vec<AttributeId>,
    },

    #[error("attribute {attribute_id} appears more than once")]
    DuplicateAttributeId { attribute_id: AttributeId },

    #[error("entity {entity_id} appears more than once")]
    DuplicateEntityId { entity_id: EntityId },

    #[error("expected a row for entity {expected}, found entity {found}")]
    ForeignEntityRow { expected: EntityId, found: EntityId },

    #[error("response carries no entity row")]
    MissingEntityRow,
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<rowsync_api::Error> for CoreError {
    fn from(err: rowsync_api::Error) -> Self {
        match err {
            rowsync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            rowsync_api::Error::Forbidden { message } => CoreError::Api {
                message: format!("Forbidden: {message}"),
                status: Some(403),
            },
            // A client that knows its timeout reports `Error::Timeout` itself.
            rowsync_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            rowsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            rowsync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            rowsync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            rowsync_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: path,
            },
            rowsync_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            rowsync_api::Error::Unconfigured { service } => CoreError::Config {
                message: format!("no URL configured for the {service} service"),
            },
            rowsync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
