// ── Domain model ──
//
// Pure data: cells, records, the hierarchy, and lookup data. Nothing in
// here talks to the network or mutates shared state.

pub mod attribute;
pub mod cell;
pub mod dictionary;
pub mod entity;
pub mod field;
pub mod file;
pub mod hierarchy;
pub mod ids;
pub mod row;

pub use attribute::{Attribute, AttributeCells};
pub use cell::{Cell, ValidationMessage};
pub use dictionary::{ConnectionPoint, Dictionaries, DictionaryKind, Domain, StorageType, TypeEntry};
pub use entity::{CHANGE_TYPE_DELETED, Entity, EntityCells};
pub use field::{AttributeField, AttributeValues, EntityField, EntityValues, FieldValues};
pub use file::{FileContainer, Verdict};
pub use hierarchy::Hierarchy;
pub use ids::{AttributeId, EntityId, FileId};
pub use row::{EntityRow, Row};
