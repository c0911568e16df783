//! Static skip-logic table: parent field → dependent targets.

use std::collections::{BTreeSet, HashMap};

use crate::{FieldId, Question, Questionnaire};

/// One rule: `target` is shown while `parent`'s answer contains a trigger value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionEntry {
    /// The field whose answer governs visibility.
    pub parent: FieldId,

    /// The question or section that is shown or hidden.
    pub target: FieldId,

    /// Parent values that reveal the target.
    pub triggers: BTreeSet<u32>,

    /// Whether the target is a whole section.
    pub is_section: bool,
}

impl ConditionEntry {
    /// Whether the parent's selected values reveal the target.
    pub fn is_met_by(&self, selected: &[u32]) -> bool {
        selected.iter().any(|v| self.triggers.contains(v))
    }
}

/// All condition entries of a questionnaire, indexed by parent and by target.
///
/// Each target has exactly one entry, since a question or section declares
/// at most one condition.
#[derive(Debug, Clone, Default)]
pub struct ConditionTable {
    entries: Vec<ConditionEntry>,
    by_parent: HashMap<FieldId, Vec<usize>>,
    by_target: HashMap<FieldId, usize>,
}

impl ConditionTable {
    /// Build the table from a validated questionnaire, in declaration order.
    pub fn new(questionnaire: &Questionnaire) -> Self {
        let mut table = Self::default();
        for section in questionnaire.sections() {
            if let Some(condition) = &section.condition {
                table.push(ConditionEntry {
                    parent: condition.parent.clone(),
                    target: section.id.clone(),
                    triggers: condition.values.clone(),
                    is_section: true,
                });
            }
            for question in &section.questions {
                table.collect(question);
            }
        }
        table
    }

    fn collect(&mut self, question: &Question) {
        if let Some(condition) = question.condition() {
            self.push(ConditionEntry {
                parent: condition.parent.clone(),
                target: question.id().clone(),
                triggers: condition.values.clone(),
                is_section: false,
            });
        }
        for sub in question.sub_questions() {
            self.collect(sub);
        }
    }

    fn push(&mut self, entry: ConditionEntry) {
        let idx = self.entries.len();
        self.by_parent
            .entry(entry.parent.clone())
            .or_default()
            .push(idx);
        self.by_target.insert(entry.target.clone(), idx);
        self.entries.push(entry);
    }

    /// Entries governed by `parent`, in declaration order.
    pub fn entries_for(&self, parent: &FieldId) -> impl Iterator<Item = &ConditionEntry> {
        self.by_parent
            .get(parent)
            .into_iter()
            .flatten()
            .map(|&idx| &self.entries[idx])
    }

    /// The entry that governs `target`.
    pub fn entry_for_target(&self, target: &FieldId) -> Option<&ConditionEntry> {
        self.by_target.get(target).map(|&idx| &self.entries[idx])
    }

    /// Whether some target depends on `field`.
    pub fn is_parent(&self, field: &FieldId) -> bool {
        self.by_parent.contains_key(field)
    }

    /// Whether `id` is a conditional target.
    pub fn is_target(&self, id: &FieldId) -> bool {
        self.by_target.contains_key(id)
    }

    /// Distinct parents, in order of their first entry.
    pub fn parents(&self) -> Vec<&FieldId> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .map(|e| &e.parent)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[ConditionEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the questionnaire has no conditions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
