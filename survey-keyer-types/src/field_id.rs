use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker between a choice field and the value of its "other" option,
/// e.g. `Q1_other_9`.
const OTHER_MARKER: &str = "_other_";

/// Identifier of a single answer field, e.g. `"Q3"`, `"Q5_a"` or `"Q7_year"`.
///
/// Questions expand into one or more fields. Derived fields are built by
/// appending `_`-separated suffixes to the question id, which is also how they
/// appear as column keys in exported sheets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId {
    id: String,
}

impl FieldId {
    /// Create a new field id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Append a suffix segment, returning the derived field id.
    pub fn suffixed(&self, suffix: &str) -> Self {
        if suffix.is_empty() {
            self.clone()
        } else if self.id.is_empty() {
            Self::new(suffix)
        } else {
            Self::new(format!("{}_{}", self.id, suffix))
        }
    }

    /// The free-text field that belongs to option `value` of this choice field.
    pub fn other_for(&self, value: u32) -> Self {
        Self::new(format!("{}{}{}", self.id, OTHER_MARKER, value))
    }

    /// Whether this is the free-text field of an "other" option.
    pub fn is_other(&self) -> bool {
        self.id.contains(OTHER_MARKER)
    }

    /// For an "other" text field, the owning choice field and option value.
    pub fn other_parent(&self) -> Option<(Self, u32)> {
        let (parent, value) = self.id.rsplit_once(OTHER_MARKER)?;
        let value = value.parse().ok()?;
        Some((Self::new(parent), value))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Check if the id is empty.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for FieldId {
    fn from(s: &String) -> Self {
        Self::new(s.clone())
    }
}

impl AsRef<str> for FieldId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}
