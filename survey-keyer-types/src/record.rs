use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::FieldId;

/// Column key of the record identifier.
pub const ID_FIELD: &str = "ID";

/// Column key of the entry timestamp.
pub const TIMESTAMP_FIELD: &str = "入力日時";

/// Column key of the operator name.
pub const OPERATOR_FIELD: &str = "入力者";

/// Timestamp format of [`AnswerRecord::entered_at`].
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One saved questionnaire.
///
/// `values` holds every declared field, with an empty string for unanswered
/// ones. Multi-select answers are comma-joined option values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Identifier written on the paper form.
    #[serde(rename = "ID")]
    pub id: String,

    /// Local time of saving, formatted with [`TIMESTAMP_FORMAT`].
    #[serde(rename = "入力日時")]
    pub entered_at: String,

    /// Who keyed the record.
    #[serde(rename = "入力者")]
    pub operator: String,

    /// Cell value per field.
    pub values: BTreeMap<FieldId, String>,

    /// Answered fields that were only reachable through a forced branch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forced: Vec<FieldId>,
}

impl AnswerRecord {
    /// Create a record without field values.
    pub fn new(
        id: impl Into<String>,
        entered_at: impl Into<String>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entered_at: entered_at.into(),
            operator: operator.into(),
            values: BTreeMap::new(),
            forced: Vec::new(),
        }
    }

    /// Get the stored cell of a field (empty when unanswered or unknown).
    pub fn value(&self, field: &FieldId) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Whether the record contains answers given under a forced branch.
    pub fn has_forced_answers(&self) -> bool {
        !self.forced.is_empty()
    }

    /// Cell value of a column key, including the metadata columns.
    pub fn cell(&self, key: &str) -> &str {
        match key {
            ID_FIELD => &self.id,
            TIMESTAMP_FIELD => &self.entered_at,
            OPERATOR_FIELD => &self.operator,
            other => self
                .values
                .get(&FieldId::new(other))
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}
