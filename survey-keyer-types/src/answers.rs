use std::collections::HashMap;

use crate::{AnswerValue, FieldId};

/// Error type for answer access operations.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("Missing answer for field: {0}")]
    Missing(FieldId),

    #[error("Type mismatch at field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: FieldId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Cannot read stored cell '{cell}' for field '{field}'")]
    InvalidCell { field: FieldId, cell: String },
}

/// Answers currently held by the entry form, keyed by field id.
///
/// Unanswered fields are absent. Blank values (no checked option, empty text)
/// are never stored; setting one removes the field instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    values: HashMap<FieldId, AnswerValue>,
}

impl Answers {
    /// Create an empty answer set.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set the answer of a field. Blank values clear the field.
    ///
    /// Returns the previous value.
    pub fn insert(
        &mut self,
        field: impl Into<FieldId>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        let field = field.into();
        let value = value.into();
        if value.is_blank() {
            self.values.remove(&field)
        } else {
            self.values.insert(field, value)
        }
    }

    /// Get the answer of a field.
    pub fn get(&self, field: &FieldId) -> Option<&AnswerValue> {
        self.values.get(field)
    }

    /// Check if a field has an answer.
    pub fn contains(&self, field: &FieldId) -> bool {
        self.values.contains_key(field)
    }

    /// Remove the answer of a field.
    pub fn remove(&mut self, field: &FieldId) -> Option<AnswerValue> {
        self.values.remove(field)
    }

    /// Remove every answer.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Get an iterator over all field-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &AnswerValue)> {
        self.values.iter()
    }

    /// Get the number of answered fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is answered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Option values currently selected in a field (empty when unanswered).
    pub fn selected(&self, field: &FieldId) -> &[u32] {
        self.values
            .get(field)
            .map(AnswerValue::selected_values)
            .unwrap_or(&[])
    }

    // === Convenience accessors ===

    /// Get a single choice at the given field.
    pub fn get_choice(&self, field: &FieldId) -> Result<u32, AnswerError> {
        match self.get(field) {
            Some(AnswerValue::Choice(v)) => Ok(*v),
            Some(other) => Err(AnswerError::TypeMismatch {
                field: field.clone(),
                expected: "Choice",
                actual: other.type_name(),
            }),
            None => Err(AnswerError::Missing(field.clone())),
        }
    }

    /// Get multi-choice values at the given field.
    pub fn get_choices(&self, field: &FieldId) -> Result<&[u32], AnswerError> {
        match self.get(field) {
            Some(AnswerValue::Choices(values)) => Ok(values),
            Some(other) => Err(AnswerError::TypeMismatch {
                field: field.clone(),
                expected: "Choices",
                actual: other.type_name(),
            }),
            None => Err(AnswerError::Missing(field.clone())),
        }
    }

    /// Get a number at the given field.
    pub fn get_number(&self, field: &FieldId) -> Result<i64, AnswerError> {
        match self.get(field) {
            Some(AnswerValue::Number(n)) => Ok(*n),
            Some(other) => Err(AnswerError::TypeMismatch {
                field: field.clone(),
                expected: "Number",
                actual: other.type_name(),
            }),
            None => Err(AnswerError::Missing(field.clone())),
        }
    }

    /// Get text at the given field.
    pub fn get_text(&self, field: &FieldId) -> Result<&str, AnswerError> {
        match self.get(field) {
            Some(AnswerValue::Text(s)) => Ok(s),
            Some(other) => Err(AnswerError::TypeMismatch {
                field: field.clone(),
                expected: "Text",
                actual: other.type_name(),
            }),
            None => Err(AnswerError::Missing(field.clone())),
        }
    }
}

impl IntoIterator for Answers {
    type Item = (FieldId, AnswerValue);
    type IntoIter = std::collections::hash_map::IntoIter<FieldId, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = (&'a FieldId, &'a AnswerValue);
    type IntoIter = std::collections::hash_map::Iter<'a, FieldId, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
