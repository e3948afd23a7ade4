// ── Tagged field access ──
//
// Entities and attributes have a fixed set of named cells. These closed
// enums name them, so callers address a cell through an exhaustive match
// instead of a runtime string key. The string forms are the wire keys.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// The named cells of an entity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum EntityField {
    SchemaName,
    EntityName,
    EntityDesc,
    TableType,
    ChangeType,
    /// Storage type.
    DestName,
    /// Entity type.
    DetName,
    Domain,
    ConnPoint,
}

impl EntityField {
    /// Column heading for tabular output.
    pub fn label(self) -> &'static str {
        match self {
            Self::SchemaName => "Schema",
            Self::EntityName => "Name",
            Self::EntityDesc => "Description",
            Self::TableType => "Table Type",
            Self::ChangeType => "Change",
            Self::DestName => "Storage Type",
            Self::DetName => "Entity Type",
            Self::Domain => "Domain",
            Self::ConnPoint => "Connection Point",
        }
    }
}

/// The named cells of an attribute.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum AttributeField {
    AttrName,
    AttrDesc,
    AttrType,
    AttrSize,
    AttrPrec,
    AttrMand,
    AttrPk,
    ChangeType,
}

impl AttributeField {
    pub fn label(self) -> &'static str {
        match self {
            Self::AttrName => "Name",
            Self::AttrDesc => "Description",
            Self::AttrType => "Type",
            Self::AttrSize => "Size",
            Self::AttrPrec => "Precision",
            Self::AttrMand => "Mandatory",
            Self::AttrPk => "PK",
            Self::ChangeType => "Change",
        }
    }
}

// ── Field values ────────────────────────────────────────────────────

/// The full set of plain values of a record, keyed by field.
///
/// Edits and copies send every field of the record to the service, so
/// this always holds one entry per field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues<F: Copy + Eq + Hash> {
    values: IndexMap<F, Option<String>>,
}

pub type EntityValues = FieldValues<EntityField>;
pub type AttributeValues = FieldValues<AttributeField>;

impl<F: Copy + Eq + Hash + IntoEnumIterator> FieldValues<F> {
    /// Build from a lookup, visiting every field once.
    pub fn collect(mut lookup: impl FnMut(F) -> Option<String>) -> Self {
        Self {
            values: F::iter().map(|field| (field, lookup(field))).collect(),
        }
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.values.get(&field).and_then(|v| v.as_deref())
    }

    /// Replace one field's value.
    pub fn with(mut self, field: F, value: Option<String>) -> Self {
        self.values.insert(field, value);
        self
    }

    /// Consume into an owned value for one field.
    pub fn take(&mut self, field: F) -> Option<String> {
        self.values.get_mut(&field).and_then(Option::take)
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, Option<&str>)> {
        self.values.iter().map(|(f, v)| (*f, v.as_deref()))
    }
}
