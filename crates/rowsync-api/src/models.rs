// Wire types for the record, container, and dictionary endpoints.
//
// These mirror the JSON the services emit, field for field. Every cell and
// optional column is defaulted so a partially populated row still decodes;
// normalisation into domain types happens in `rowsync-core`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Cells ───────────────────────────────────────────────────────────

/// One structured diagnostic attached to a cell or a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub message: String,
    /// The services spell this key `recomendation`.
    #[serde(default, rename = "recomendation", alias = "recommendation")]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub error_flg: Option<bool>,
}

/// A validated field as sent by the record service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCell {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub original_value: Option<String>,
    #[serde(default)]
    pub error_flg: Option<bool>,
    #[serde(default)]
    pub message: Option<Vec<RawMessage>>,
}

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntity {
    pub entity_id: i64,
    #[serde(default)]
    pub excel_file_id: Option<i64>,
    #[serde(default)]
    pub schema_name: RawCell,
    #[serde(default)]
    pub entity_name: RawCell,
    #[serde(default)]
    pub entity_desc: RawCell,
    #[serde(default)]
    pub table_type: RawCell,
    #[serde(default)]
    pub change_type: RawCell,
    /// Storage type.
    #[serde(default)]
    pub dest_name: RawCell,
    /// Entity type.
    #[serde(default)]
    pub det_name: RawCell,
    #[serde(default)]
    pub domain: RawCell,
    #[serde(default)]
    pub conn_point: RawCell,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttribute {
    pub id: i64,
    pub entity_id: i64,
    #[serde(default)]
    pub excel_file_id: Option<i64>,
    #[serde(default)]
    pub attr_name: RawCell,
    #[serde(default)]
    pub attr_desc: RawCell,
    #[serde(default)]
    pub attr_type: RawCell,
    #[serde(default)]
    pub attr_size: RawCell,
    #[serde(default)]
    pub attr_prec: RawCell,
    #[serde(default)]
    pub attr_mand: RawCell,
    #[serde(default)]
    pub attr_pk: RawCell,
    #[serde(default)]
    pub change_type: RawCell,
}

/// A row of a flat row-set, discriminated by its `rowType` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rowType")]
pub enum RawRow {
    #[serde(rename = "ENTITY")]
    Entity(RawEntity),
    #[serde(rename = "ATTRIBUTE")]
    Attribute(RawAttribute),
}

/// Envelope of the full fetch: `{"rows": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RowsEnvelope {
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

// ── Request bodies ──────────────────────────────────────────────────

/// Full field set of an entity, sent on update and copy.
///
/// `None` serialises as `null`; the service expects every key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBody {
    pub schema_name: Option<String>,
    pub entity_name: Option<String>,
    pub entity_desc: Option<String>,
    pub table_type: Option<String>,
    pub change_type: Option<String>,
    pub dest_name: Option<String>,
    pub det_name: Option<String>,
    pub domain: Option<String>,
    pub conn_point: Option<String>,
}

/// Full field set of an attribute, sent on update and copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeBody {
    pub attr_name: Option<String>,
    pub attr_desc: Option<String>,
    pub attr_type: Option<String>,
    pub attr_size: Option<String>,
    pub attr_prec: Option<String>,
    pub attr_mand: Option<String>,
    pub attr_pk: Option<String>,
    pub change_type: Option<String>,
}

// ── Containers ──────────────────────────────────────────────────────

/// An imported file ("container") that produced entities and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContainer {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at_as_string: String,
    #[serde(default)]
    pub loaded_at_as_string: String,
    #[serde(default)]
    pub modified_at_as_string: String,
    #[serde(default)]
    pub error_flg: Option<bool>,
    #[serde(default)]
    pub message: Option<Vec<RawMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContainersEnvelope {
    #[serde(default)]
    pub containers: Vec<RawContainer>,
}

/// Body of a document validation reply, on success and on rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValidationReply {
    #[serde(default)]
    pub message: Option<String>,
}

/// Outcome of validating an exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentVerdict {
    pub passed: bool,
    pub message: Option<String>,
}

// ── Dictionaries ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeTypesEnvelope {
    #[serde(default)]
    pub change_types: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntityType {
    #[serde(default)]
    pub det_desc: String,
    #[serde(default)]
    pub det_nme_unq: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttributeType {
    #[serde(default)]
    pub dagt_desc: String,
    #[serde(default)]
    pub dagt_nme_unq: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStorageType {
    #[serde(default)]
    pub dest_desc: String,
    #[serde(default)]
    pub dest_nme_unq: String,
    #[serde(default)]
    pub dest_sys_typ_nme: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTableType {
    #[serde(default)]
    pub dtt_desc: String,
    #[serde(default)]
    pub dtt_nme_unq: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDomain {
    #[serde(default)]
    pub dm_nme_unq: String,
    #[serde(default)]
    pub dm_nme: String,
    #[serde(default)]
    pub dm_desc: String,
    #[serde(default)]
    pub dm_owner_last_name: Option<String>,
    #[serde(default)]
    pub dm_owner_first_name: Option<String>,
    #[serde(default)]
    pub dm_owner_second_name: Option<String>,
    #[serde(default)]
    pub dm_owner_email: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParameterRef {
    #[serde(default)]
    pub param_nme_unq: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParameterGroupRef {
    #[serde(default)]
    pub pg_nme_unq: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnectionPoint {
    #[serde(default)]
    pub cp_nme_unq: String,
    #[serde(default)]
    pub cp_desc: String,
    #[serde(default)]
    pub cp_host: String,
    #[serde(default)]
    pub cp_port: String,
    #[serde(default)]
    pub cp_version: String,
    #[serde(default)]
    pub cp_object_name: String,
    #[serde(default)]
    pub cp_user: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub parameters: Vec<RawParameterRef>,
    #[serde(default)]
    pub parameter_groups: Vec<RawParameterGroupRef>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_decode_by_row_type_tag() {
        let rows: Vec<RawRow> = serde_json::from_value(json!([
            {
                "rowType": "ATTRIBUTE",
                "id": 7,
                "entityId": 1,
                "excelFileId": null,
                "attrName": { "value": "ID", "errorFlg": false, "message": null }
            },
            {
                "rowType": "ENTITY",
                "entityId": 1,
                "excelFileId": 10,
                "entityName": { "value": "CLIENT", "originalValue": "CLIENT", "errorFlg": false }
            }
        ]))
        .unwrap();

        assert_eq!(rows.len(), 2);
        let RawRow::Attribute(attr) = &rows[0] else {
            panic!("expected attribute row, got {:?}", rows[0]);
        };
        assert_eq!(attr.id, 7);
        assert_eq!(attr.excel_file_id, None);
        assert_eq!(attr.attr_name.value.as_deref(), Some("ID"));
        assert_eq!(attr.attr_desc, RawCell::default());

        let RawRow::Entity(entity) = &rows[1] else {
            panic!("expected entity row, got {:?}", rows[1]);
        };
        assert_eq!(entity.excel_file_id, Some(10));
        assert_eq!(entity.entity_name.original_value.as_deref(), Some("CLIENT"));
    }

    #[test]
    fn message_accepts_both_recommendation_spellings() {
        let misspelled: RawMessage = serde_json::from_value(json!({
            "message": "too long",
            "recomendation": "shorten it",
            "example": "ABC",
            "errorFlg": true
        }))
        .unwrap();
        assert_eq!(misspelled.recommendation.as_deref(), Some("shorten it"));

        let spelled: RawMessage =
            serde_json::from_value(json!({ "message": "m", "recommendation": "r" })).unwrap();
        assert_eq!(spelled.recommendation.as_deref(), Some("r"));
    }

    #[test]
    fn bodies_serialise_every_key() {
        let body = EntityBody {
            entity_name: Some("CLIENT".into()),
            ..EntityBody::default()
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["entityName"], "CLIENT");
        assert!(value["schemaName"].is_null());
        assert_eq!(value.as_object().unwrap().len(), 9);
    }
}
