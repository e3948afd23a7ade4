// ── API-to-domain type conversions ──
//
// Bridges raw `rowsync_api` response types into canonical domain types,
// and domain field values back into request bodies. Cells are normalised
// here so nothing downstream ever sees a flag without diagnostics.

use rowsync_api::{
    AttributeBody, DocumentVerdict, EntityBody, RawAttribute, RawAttributeType, RawCell,
    RawConnectionPoint, RawContainer, RawDomain, RawEntity, RawEntityType, RawMessage, RawRow,
    RawStorageType, RawTableType,
};
use tracing::{debug, warn};

use crate::model::{
    Attribute, AttributeCells, AttributeField, AttributeId, AttributeValues, Cell,
    ConnectionPoint, Domain, EntityCells, EntityField, EntityId, EntityRow, EntityValues,
    FileContainer, FileId, Row, StorageType, TypeEntry, ValidationMessage, Verdict,
};

// ── Cells ────────────────────────────────────────────────────────────

impl From<RawMessage> for ValidationMessage {
    fn from(raw: RawMessage) -> Self {
        Self {
            message: raw.message,
            recommendation: raw.recommendation,
            example: raw.example,
            error_flg: raw.error_flg,
        }
    }
}

fn messages(raw: Option<Vec<RawMessage>>) -> Vec<ValidationMessage> {
    raw.unwrap_or_default().into_iter().map(Into::into).collect()
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        let flagged = raw.error_flg.unwrap_or(false);
        let mut diagnostics = messages(raw.message);

        if flagged && diagnostics.is_empty() {
            warn!(value = ?raw.value, "cell flagged in error without diagnostics");
            diagnostics.push(ValidationMessage::unspecified());
        } else if !flagged && !diagnostics.is_empty() {
            debug!(value = ?raw.value, "cell carries diagnostics without error flag");
        }

        Cell::with_original(raw.value, raw.original_value).with_messages(diagnostics)
    }
}

// ── Rows ─────────────────────────────────────────────────────────────

impl From<RawEntity> for EntityRow {
    fn from(raw: RawEntity) -> Self {
        Self {
            id: EntityId::new(raw.entity_id),
            file_id: raw.excel_file_id.map(FileId::new),
            cells: EntityCells {
                schema_name: raw.schema_name.into(),
                entity_name: raw.entity_name.into(),
                entity_desc: raw.entity_desc.into(),
                table_type: raw.table_type.into(),
                change_type: raw.change_type.into(),
                dest_name: raw.dest_name.into(),
                det_name: raw.det_name.into(),
                domain: raw.domain.into(),
                conn_point: raw.conn_point.into(),
            },
        }
    }
}

impl From<RawAttribute> for Attribute {
    fn from(raw: RawAttribute) -> Self {
        Self {
            id: AttributeId::new(raw.id),
            entity_id: EntityId::new(raw.entity_id),
            file_id: raw.excel_file_id.map(FileId::new),
            cells: AttributeCells {
                attr_name: raw.attr_name.into(),
                attr_desc: raw.attr_desc.into(),
                attr_type: raw.attr_type.into(),
                attr_size: raw.attr_size.into(),
                attr_prec: raw.attr_prec.into(),
                attr_mand: raw.attr_mand.into(),
                attr_pk: raw.attr_pk.into(),
                change_type: raw.change_type.into(),
            },
        }
    }
}

impl From<RawRow> for Row {
    fn from(raw: RawRow) -> Self {
        match raw {
            RawRow::Entity(e) => Self::Entity(e.into()),
            RawRow::Attribute(a) => Self::Attribute(a.into()),
        }
    }
}

pub(crate) fn rows(raw: Vec<RawRow>) -> Vec<Row> {
    raw.into_iter().map(Row::from).collect()
}

// ── Request bodies ───────────────────────────────────────────────────

impl From<EntityValues> for EntityBody {
    fn from(mut values: EntityValues) -> Self {
        Self {
            schema_name: values.take(EntityField::SchemaName),
            entity_name: values.take(EntityField::EntityName),
            entity_desc: values.take(EntityField::EntityDesc),
            table_type: values.take(EntityField::TableType),
            change_type: values.take(EntityField::ChangeType),
            dest_name: values.take(EntityField::DestName),
            det_name: values.take(EntityField::DetName),
            domain: values.take(EntityField::Domain),
            conn_point: values.take(EntityField::ConnPoint),
        }
    }
}

impl From<AttributeValues> for AttributeBody {
    fn from(mut values: AttributeValues) -> Self {
        Self {
            attr_name: values.take(AttributeField::AttrName),
            attr_desc: values.take(AttributeField::AttrDesc),
            attr_type: values.take(AttributeField::AttrType),
            attr_size: values.take(AttributeField::AttrSize),
            attr_prec: values.take(AttributeField::AttrPrec),
            attr_mand: values.take(AttributeField::AttrMand),
            attr_pk: values.take(AttributeField::AttrPk),
            change_type: values.take(AttributeField::ChangeType),
        }
    }
}

// ── Files ────────────────────────────────────────────────────────────

impl From<RawContainer> for FileContainer {
    fn from(raw: RawContainer) -> Self {
        let mut diagnostics = messages(raw.message);
        if raw.error_flg == Some(true) && diagnostics.is_empty() {
            diagnostics.push(ValidationMessage::new("import failed"));
        }
        Self {
            id: FileId::new(raw.id),
            name: raw.name,
            ext: raw.ext,
            full_name: raw.full_name,
            created_by: raw.created_by,
            created_at: raw.created_at_as_string,
            loaded_at: raw.loaded_at_as_string,
            modified_at: raw.modified_at_as_string,
            messages: diagnostics,
        }
    }
}

impl From<DocumentVerdict> for Verdict {
    fn from(raw: DocumentVerdict) -> Self {
        Self {
            passed: raw.passed,
            message: raw.message,
        }
    }
}

// ── Dictionaries ─────────────────────────────────────────────────────

impl From<RawTableType> for TypeEntry {
    fn from(raw: RawTableType) -> Self {
        Self {
            code: raw.dtt_nme_unq,
            description: raw.dtt_desc,
        }
    }
}

impl From<RawEntityType> for TypeEntry {
    fn from(raw: RawEntityType) -> Self {
        Self {
            code: raw.det_nme_unq,
            description: raw.det_desc,
        }
    }
}

impl From<RawAttributeType> for TypeEntry {
    fn from(raw: RawAttributeType) -> Self {
        Self {
            code: raw.dagt_nme_unq,
            description: raw.dagt_desc,
        }
    }
}

impl From<RawStorageType> for StorageType {
    fn from(raw: RawStorageType) -> Self {
        Self {
            code: raw.dest_nme_unq,
            description: raw.dest_desc,
            system_type: raw.dest_sys_typ_nme,
        }
    }
}

impl From<RawDomain> for Domain {
    fn from(raw: RawDomain) -> Self {
        let owner: Vec<String> = [
            raw.dm_owner_last_name,
            raw.dm_owner_first_name,
            raw.dm_owner_second_name,
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

        Self {
            code: raw.dm_nme_unq,
            name: raw.dm_nme,
            description: raw.dm_desc,
            owner: (!owner.is_empty()).then(|| owner.join(" ")),
            owner_email: raw.dm_owner_email,
            parent: raw.domain,
        }
    }
}

impl From<RawConnectionPoint> for ConnectionPoint {
    fn from(raw: RawConnectionPoint) -> Self {
        Self {
            code: raw.cp_nme_unq,
            description: raw.cp_desc,
            host: raw.cp_host,
            port: raw.cp_port,
            version: raw.cp_version,
            object_name: raw.cp_object_name,
            user: raw.cp_user,
            domain: raw.domain,
            parameters: raw.parameters.into_iter().map(|p| p.param_nme_unq).collect(),
            parameter_groups: raw
                .parameter_groups
                .into_iter()
                .map(|g| g.pg_nme_unq)
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_cell(flag: Option<bool>, msgs: Option<Vec<&str>>) -> RawCell {
        RawCell {
            value: Some("v".into()),
            original_value: Some("v".into()),
            error_flg: flag,
            message: msgs.map(|m| {
                m.into_iter()
                    .map(|text| RawMessage {
                        message: text.into(),
                        ..RawMessage::default()
                    })
                    .collect()
            }),
            ..RawCell::default()
        }
    }

    #[test]
    fn flag_without_messages_gets_placeholder() {
        let cell = Cell::from(raw_cell(Some(true), None));
        assert!(cell.error_flg());
        assert_eq!(cell.messages().len(), 1);
    }

    #[test]
    fn messages_without_flag_put_cell_in_error() {
        let cell = Cell::from(raw_cell(Some(false), Some(vec!["too long"])));
        assert!(cell.error_flg());
        assert_eq!(cell.messages()[0].message, "too long");
    }

    #[test]
    fn clean_cell_stays_clean() {
        let cell = Cell::from(raw_cell(None, Some(vec![])));
        assert!(!cell.error_flg());
        assert_eq!(cell.value(), Some("v"));
    }

    #[test]
    fn entity_values_become_full_body() {
        let values = EntityValues::collect(|_| None).with(EntityField::DetName, Some("DIM".into()));
        let body = EntityBody::from(values);
        assert_eq!(body.det_name.as_deref(), Some("DIM"));
        assert_eq!(body.entity_name, None);
    }

    #[test]
    fn domain_owner_joins_present_parts() {
        let domain = Domain::from(RawDomain {
            dm_nme_unq: "SALES".into(),
            dm_owner_last_name: Some("Ivanova".into()),
            dm_owner_first_name: Some("Anna".into()),
            dm_owner_second_name: None,
            ..RawDomain::default()
        });
        assert_eq!(domain.owner.as_deref(), Some("Ivanova Anna"));
    }

    #[test]
    fn raw_rows_keep_provenance() {
        let row = Row::from(RawRow::Attribute(RawAttribute {
            id: 5,
            entity_id: 1,
            excel_file_id: Some(10),
            ..RawAttribute::default()
        }));
        let Row::Attribute(attr) = row else {
            panic!("expected attribute");
        };
        assert_eq!(attr.file_id, Some(FileId::new(10)));
        assert_eq!(attr.entity_id, EntityId::new(1));
    }
}
