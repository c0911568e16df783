use std::collections::BTreeSet;

use crate::FieldId;

/// Visibility condition of a question or section: shown while the parent
/// field's answer contains one of the trigger values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// The field whose answer governs visibility.
    pub parent: FieldId,

    /// Parent values that reveal the target.
    pub values: BTreeSet<u32>,
}

impl Condition {
    /// Create a condition on `parent` with the given trigger values.
    pub fn new(parent: impl Into<FieldId>, values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            parent: parent.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Whether the parent's selected values satisfy this condition.
    ///
    /// Single and multi choice share one rule: some selected value must be a
    /// trigger. An unanswered parent never satisfies a condition.
    pub fn is_met_by(&self, selected: &[u32]) -> bool {
        selected.iter().any(|v| self.values.contains(v))
    }
}
