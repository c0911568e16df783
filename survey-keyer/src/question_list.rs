//! Flattened navigation order of all questions.

use std::collections::HashMap;

use crate::{
    ConditionTable, FieldId, FieldSpec, Question, QuestionKind, Questionnaire, answer_fields,
};

/// A question in navigation order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    /// The question id.
    pub id: FieldId,

    /// The prompt text.
    pub title: String,

    /// The question kind.
    pub kind: QuestionKind,

    /// Index of the section containing the question.
    pub section: usize,

    /// Nesting depth (0 for top-level questions).
    pub depth: usize,

    /// Conditional targets that must all be shown for this entry to be
    /// visible: the section (if conditional), conditional ancestors and the
    /// question itself, outermost first.
    pub guards: Vec<FieldId>,

    /// The entry's own answer fields, in column order.
    pub fields: Vec<FieldSpec>,
}

impl ListEntry {
    /// Number of navigable rows (matrix rows; 0 otherwise).
    pub fn row_count(&self) -> usize {
        self.kind.row_count()
    }

    /// The field a choice commit on `row` writes to.
    pub fn choice_field(&self, row: usize) -> Option<&FieldSpec> {
        if self.kind.is_matrix() {
            self.fields.get(row)
        } else if self.kind.is_choice() {
            self.fields.first()
        } else {
            None
        }
    }
}

/// The questionnaire flattened depth-first: each question is followed by
/// its nested sub-questions, sections in order.
#[derive(Debug, Clone, Default)]
pub struct QuestionList {
    entries: Vec<ListEntry>,
    section_titles: Vec<String>,
    by_id: HashMap<FieldId, usize>,
    by_field: HashMap<FieldId, usize>,
}

impl QuestionList {
    /// Flatten a questionnaire.
    pub fn new(questionnaire: &Questionnaire, table: &ConditionTable) -> Self {
        let mut list = Self::default();
        for (idx, section) in questionnaire.sections().iter().enumerate() {
            list.section_titles.push(section.title.clone());
            let mut guards = Vec::new();
            if table.is_target(&section.id) {
                guards.push(section.id.clone());
            }
            for question in &section.questions {
                list.push(question, idx, 0, &guards, table);
            }
        }
        list
    }

    fn push(
        &mut self,
        question: &Question,
        section: usize,
        depth: usize,
        outer: &[FieldId],
        table: &ConditionTable,
    ) {
        let mut guards = outer.to_vec();
        if table.is_target(question.id()) {
            guards.push(question.id().clone());
        }
        let idx = self.entries.len();
        let fields = answer_fields(question);
        self.by_id.insert(question.id().clone(), idx);
        for field in &fields {
            self.by_field.insert(field.id.clone(), idx);
        }
        self.entries.push(ListEntry {
            id: question.id().clone(),
            title: question.title().to_string(),
            kind: question.kind().clone(),
            section,
            depth,
            guards: guards.clone(),
            fields,
        });
        for sub in question.sub_questions() {
            self.push(sub, section, depth + 1, &guards, table);
        }
    }

    /// All entries in navigation order.
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Get the entry at `index`.
    pub fn get(&self, index: usize) -> Option<&ListEntry> {
        self.entries.get(index)
    }

    /// Index of the question with `id`.
    pub fn index_of(&self, id: &FieldId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Index of the question owning `field`.
    pub fn entry_of_field(&self, field: &FieldId) -> Option<usize> {
        self.by_field.get(field).copied()
    }

    /// Heading of section `index`.
    pub fn section_title(&self, index: usize) -> &str {
        self.section_titles
            .get(index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Every answer field nested under a conditional target, in order.
    pub fn fields_under(&self, target: &FieldId) -> Vec<FieldId> {
        self.entries
            .iter()
            .filter(|e| e.guards.contains(target))
            .flat_map(|e| e.fields.iter().map(|f| f.id.clone()))
            .collect()
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the questionnaire has no questions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> QuestionList {
        let questionnaire = example_questionnaires::commute();
        let table = ConditionTable::new(&questionnaire);
        QuestionList::new(&questionnaire, &table)
    }

    #[test]
    fn sub_questions_follow_their_parent() {
        let list = build();
        let ids: Vec<&str> = list.entries().iter().map(|e| e.id.as_str()).collect();
        let q3 = ids.iter().position(|id| *id == "Q3").unwrap();
        assert_eq!(ids[q3 + 1], "Q3a");
        assert_eq!(list.get(q3 + 1).unwrap().depth, 1);
    }

    #[test]
    fn guards_include_conditional_section() {
        let list = build();
        let idx = list.index_of(&FieldId::new("Q5")).unwrap();
        let guards: Vec<&str> = list.get(idx).unwrap().guards.iter().map(FieldId::as_str).collect();
        assert_eq!(guards, vec!["work"]);
    }

    #[test]
    fn fields_under_nested_target() {
        let list = build();
        let fields = list.fields_under(&FieldId::new("Q3"));
        let ids: Vec<&str> = fields.iter().map(FieldId::as_str).collect();
        assert!(ids.contains(&"Q3"));
        assert!(ids.contains(&"Q3a_hours"));
        assert!(!ids.contains(&"Q1"));
    }

    #[test]
    fn matrix_rows_map_to_fields() {
        let list = build();
        let idx = list.index_of(&FieldId::new("Q6")).unwrap();
        let entry = list.get(idx).unwrap();
        assert_eq!(entry.row_count(), 3);
        assert_eq!(entry.choice_field(1).unwrap().id.as_str(), "Q6_b");
        assert_eq!(list.entry_of_field(&FieldId::new("Q6_c")), Some(idx));
    }
}
