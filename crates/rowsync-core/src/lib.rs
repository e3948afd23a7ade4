// rowsync-core: Reconciliation engine between rowsync-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod controller;
mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod reconcile;
pub mod selection;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, Credentials, TlsVerification};
pub use controller::{Controller, SessionState};
pub use error::{ConsistencyFault, CoreError};
pub use reconcile::{Mutation, Reconciliation, reconcile};
pub use selection::Selection;
pub use service::{Backend, DictionaryService, FileService, RecordService};
pub use store::{Collection, DataStore, LoadStatus};
pub use filter::EntityFilter;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Records
    Attribute, AttributeCells, Cell, Entity, EntityCells, EntityRow, Hierarchy, Row,
    ValidationMessage,
    // Identifiers
    AttributeId, EntityId, FileId,
    // Fields
    AttributeField, AttributeValues, EntityField, EntityValues,
    // Supporting types
    ConnectionPoint, Dictionaries, DictionaryKind, Domain, FileContainer, StorageType, TypeEntry,
    Verdict,
};
