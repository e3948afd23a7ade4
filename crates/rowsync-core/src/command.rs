// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to the record or file service (or, for
// selection and filtering, straight to the store) and reconciles the
// response into the held hierarchy.

use crate::model::{AttributeField, AttributeId, EntityField, EntityId, FileId, Verdict};

/// All possible write operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Entity operations ────────────────────────────────────────────
    /// Set one field of an entity; the others are sent unchanged.
    UpdateEntity {
        entity_id: EntityId,
        field: EntityField,
        value: Option<String>,
    },
    AddEntity,
    /// Create an entity with the source's values and copies of all its
    /// attributes.
    CopyEntity {
        entity_id: EntityId,
    },
    RemoveEntity {
        entity_id: EntityId,
    },

    // ── Attribute operations ─────────────────────────────────────────
    UpdateAttribute {
        entity_id: EntityId,
        attribute_id: AttributeId,
        field: AttributeField,
        value: Option<String>,
    },
    AddAttribute {
        entity_id: EntityId,
    },
    CopyAttribute {
        entity_id: EntityId,
        attribute_id: AttributeId,
    },
    RemoveAttribute {
        entity_id: EntityId,
        attribute_id: AttributeId,
    },

    // ── Provenance files ─────────────────────────────────────────────
    /// Delete an imported file and every entity it produced.
    RemoveFile {
        file_id: FileId,
    },
    /// Flip a file in or out of the visibility filter.
    ToggleFileFilter {
        file_id: FileId,
    },

    // ── Selection & export ───────────────────────────────────────────
    SelectEntity {
        entity_id: EntityId,
        checked: bool,
    },
    SelectAttributes {
        entity_id: EntityId,
        attribute_ids: Vec<AttributeId>,
    },
    /// Render the export document for the current selection.
    Export,
    /// Export the current selection and check the document against the
    /// metadata service.
    Validate,
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Applied and published.
    Ok,
    /// The service accepted the change but its response was superseded by
    /// a newer request, or its target vanished meanwhile.
    Discarded,
    EntityCreated {
        entity_id: EntityId,
    },
    AttributeCreated {
        entity_id: EntityId,
        attribute_id: AttributeId,
    },
    FileFilterToggled {
        file_id: FileId,
        active: bool,
    },
    Exported(String),
    Validated(Verdict),
}
