// ── Validated cells ──
//
// Every editable field of an entity or attribute is a `Cell`: the current
// value, the value last confirmed by the service, and the diagnostics the
// service attached on its last revalidation.
//
// The error flag is derived from the diagnostics, so a cell is in error
// exactly when it carries at least one message. Construction from wire
// data normalises inconsistent input (see `convert`).

use serde::{Deserialize, Serialize};

/// One structured diagnostic attached to a cell or a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    pub message: String,
    pub recommendation: Option<String>,
    pub example: Option<String>,
    pub error_flg: Option<bool>,
}

impl ValidationMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recommendation: None,
            example: None,
            error_flg: Some(true),
        }
    }

    /// Stand-in for a cell the service flagged without saying why.
    pub(crate) fn unspecified() -> Self {
        Self::new("invalid value")
    }
}

/// A validated field value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "CellRepr")]
pub struct Cell {
    value: Option<String>,
    original_value: Option<String>,
    messages: Vec<ValidationMessage>,
}

impl Cell {
    /// A clean cell whose value is also its confirmed value.
    pub fn new(value: Option<String>) -> Self {
        Self {
            original_value: value.clone(),
            value,
            messages: Vec::new(),
        }
    }

    pub fn with_original(value: Option<String>, original_value: Option<String>) -> Self {
        Self {
            value,
            original_value,
            messages: Vec::new(),
        }
    }

    /// Attach diagnostics. A non-empty list puts the cell in error.
    pub fn with_messages(mut self, messages: Vec<ValidationMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn original_value(&self) -> Option<&str> {
        self.original_value.as_deref()
    }

    pub fn error_flg(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// The current value differs from the last confirmed one.
    pub fn is_modified(&self) -> bool {
        self.value != self.original_value
    }

    /// The same value with its error state reset.
    pub fn cleared(&self) -> Self {
        Self {
            value: self.value.clone(),
            original_value: self.original_value.clone(),
            messages: Vec::new(),
        }
    }
}

/// Wire-shaped view used for serialisation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CellRepr {
    value: Option<String>,
    original_value: Option<String>,
    error_flg: bool,
    message: Option<Vec<ValidationMessage>>,
}

impl From<Cell> for CellRepr {
    fn from(cell: Cell) -> Self {
        Self {
            error_flg: cell.error_flg(),
            message: (!cell.messages.is_empty()).then_some(cell.messages),
            value: cell.value,
            original_value: cell.original_value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flag_follows_messages() {
        let cell = Cell::new(Some("x".into()));
        assert!(!cell.error_flg());

        let cell = cell.with_messages(vec![ValidationMessage::new("too long")]);
        assert!(cell.error_flg());
        assert_eq!(cell.messages().len(), 1);
    }

    #[test]
    fn cleared_keeps_value_and_drops_diagnostics() {
        let cell = Cell::with_original(Some("new".into()), Some("old".into()))
            .with_messages(vec![ValidationMessage::new("bad")]);
        let cleared = cell.cleared();

        assert!(!cleared.error_flg());
        assert!(cleared.messages().is_empty());
        assert_eq!(cleared.value(), Some("new"));
        assert!(cleared.is_modified());
    }

    #[test]
    fn serialises_in_wire_shape() {
        let clean = serde_json::to_value(Cell::new(Some("ID".into()))).unwrap();
        assert_eq!(clean["errorFlg"], false);
        assert!(clean["message"].is_null());

        let bad = Cell::new(None).with_messages(vec![ValidationMessage::new("required")]);
        let bad = serde_json::to_value(bad).unwrap();
        assert_eq!(bad["errorFlg"], true);
        assert_eq!(bad["message"][0]["message"], "required");
    }
}
