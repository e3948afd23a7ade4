// rowsync-api: Async Rust client for the entity/attribute validation services

pub mod client;
pub mod containers;
pub mod dictionaries;
pub mod error;
pub mod models;
pub mod rows;
pub mod transport;

pub use client::{ApiClient, Credentials, ServiceEndpoint};
pub use error::Error;
pub use models::{
    AttributeBody, DocumentVerdict, EntityBody, RawAttribute, RawAttributeType, RawCell,
    RawConnectionPoint, RawContainer, RawDomain, RawEntity, RawEntityType, RawMessage, RawRow,
    RawStorageType, RawTableType,
};
pub use transport::{TlsMode, TransportConfig};
