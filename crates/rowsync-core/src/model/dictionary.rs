// ── Lookup dictionaries ──
//
// Enumerations used to present choices for cell values. They have no
// bearing on reconciliation. Each kind loads independently.

use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

/// Which dictionary a lookup result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum DictionaryKind {
    ChangeTypes,
    TableTypes,
    EntityTypes,
    StorageTypes,
    AttributeTypes,
    Domains,
    ConnectionPoints,
}

/// A code with its human description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeEntry {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageType {
    pub code: String,
    pub description: String,
    pub system_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub code: String,
    pub name: String,
    pub description: String,
    /// Owner's full name, when known.
    pub owner: Option<String>,
    pub owner_email: String,
    pub parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPoint {
    pub code: String,
    pub description: String,
    pub host: String,
    pub port: String,
    pub version: String,
    pub object_name: String,
    pub user: String,
    pub domain: String,
    pub parameters: Vec<String>,
    pub parameter_groups: Vec<String>,
}

/// Every dictionary loaded so far. Kinds that failed to load stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionaries {
    /// Change-type code to display label, in service order.
    pub change_types: IndexMap<String, String>,
    pub table_types: Vec<TypeEntry>,
    pub entity_types: Vec<TypeEntry>,
    pub storage_types: Vec<StorageType>,
    pub attribute_types: Vec<TypeEntry>,
    pub domains: Vec<Domain>,
    pub connection_points: Vec<ConnectionPoint>,
}

impl Dictionaries {
    /// Number of entries held for one kind.
    pub fn len_of(&self, kind: DictionaryKind) -> usize {
        match kind {
            DictionaryKind::ChangeTypes => self.change_types.len(),
            DictionaryKind::TableTypes => self.table_types.len(),
            DictionaryKind::EntityTypes => self.entity_types.len(),
            DictionaryKind::StorageTypes => self.storage_types.len(),
            DictionaryKind::AttributeTypes => self.attribute_types.len(),
            DictionaryKind::Domains => self.domains.len(),
            DictionaryKind::ConnectionPoints => self.connection_points.len(),
        }
    }

    /// Display label for a change-type code, falling back to the code.
    pub fn change_type_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.change_types.get(code).map_or(code, String::as_str)
    }
}
