use crate::{AnswerError, FieldId};

/// How a field's answer is shaped. Determines parsing of stored cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// One option value (radio, dropdown, scale, matrix row).
    Single,
    /// Any number of option values (checkbox, multi matrix row).
    Multi,
    /// An integer typed by the operator.
    Number,
    /// Free text.
    Text,
}

/// A single answer held by the entry form for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    /// A selected option value.
    Choice(u32),

    /// Selected option values of a multi-choice field, ascending and unique.
    Choices(Vec<u32>),

    /// An integer value.
    Number(i64),

    /// Free text (short/long text, dates, "other" details).
    Text(String),
}

impl AnswerValue {
    /// Build a multi-choice value, normalizing order and duplicates.
    pub fn choices(values: impl IntoIterator<Item = u32>) -> Self {
        let mut values: Vec<u32> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        Self::Choices(values)
    }

    /// Try to get this value as a single choice.
    pub fn as_choice(&self) -> Option<u32> {
        match self {
            Self::Choice(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this value as a list of choices.
    pub fn as_choices(&self) -> Option<&[u32]> {
        match self {
            Self::Choices(values) => Some(values),
            _ => None,
        }
    }

    /// Try to get this value as a number.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Option values selected by this answer. Empty for non-choice values.
    pub fn selected_values(&self) -> &[u32] {
        match self {
            Self::Choice(v) => std::slice::from_ref(v),
            Self::Choices(values) => values,
            Self::Number(_) | Self::Text(_) => &[],
        }
    }

    /// Whether the answer carries no data (no choices, empty text).
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Choices(values) => values.is_empty(),
            Self::Text(s) => s.is_empty(),
            Self::Choice(_) | Self::Number(_) => false,
        }
    }

    /// Render the value as a stored cell: multi-select values are comma-joined.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Choice(v) => v.to_string(),
            Self::Choices(values) => values
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Parse a stored cell back into a value. Empty cells yield `None`.
    pub fn parse_cell(
        field: &FieldId,
        kind: ValueKind,
        cell: &str,
    ) -> Result<Option<Self>, AnswerError> {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let invalid = || AnswerError::InvalidCell {
            field: field.clone(),
            cell: cell.to_string(),
        };
        let value = match kind {
            ValueKind::Single => Self::Choice(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Multi => {
                let values = trimmed
                    .split(',')
                    .map(|part| part.trim().parse::<u32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                Self::choices(values)
            }
            ValueKind::Number => Self::Number(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Text => Self::Text(cell.to_string()),
        };
        Ok(Some(value))
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Choice(_) => "Choice",
            Self::Choices(_) => "Choices",
            Self::Number(_) => "Number",
            Self::Text(_) => "Text",
        }
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for AnswerValue {
    fn from(v: u32) -> Self {
        Self::Choice(v)
    }
}

impl From<Vec<u32>> for AnswerValue {
    fn from(values: Vec<u32>) -> Self {
        Self::choices(values)
    }
}
