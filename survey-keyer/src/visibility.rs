//! Visibility evaluation with manual overrides, show-all mode and
//! clearing of hidden inputs.
//!
//! The state caches the *displayed* visibility of every conditional target.
//! Transitions are detected against that cache, so re-evaluating an
//! unchanged answer is a no-op.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{Answers, ConditionTable, FieldId, ListEntry, QuestionList};

/// A change in displayed visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityChange {
    /// The target became visible.
    Shown(FieldId),

    /// The target became hidden and the listed inputs lost their values.
    Hidden {
        /// The hidden question or section.
        target: FieldId,
        /// Fields under the target that held a value.
        cleared: Vec<FieldId>,
    },
}

/// Compute the displayed visibility of every target from scratch.
///
/// A target is shown when show-all is on, when it has a manual override, or
/// when its parent's answer contains a trigger value.
pub fn compute_visibility(
    table: &ConditionTable,
    answers: &Answers,
    overrides: &HashSet<FieldId>,
    show_all: bool,
) -> HashMap<FieldId, bool> {
    table
        .entries()
        .iter()
        .map(|entry| {
            let shown = show_all
                || overrides.contains(&entry.target)
                || entry.is_met_by(answers.selected(&entry.parent));
            (entry.target.clone(), shown)
        })
        .collect()
}

/// Displayed visibility of all conditional targets.
#[derive(Debug, Clone, Default)]
pub struct VisibilityState {
    shown: HashMap<FieldId, bool>,
    overrides: HashSet<FieldId>,
    show_all: bool,
}

impl VisibilityState {
    /// Initial state for a set of answers, without clearing anything.
    pub fn new(table: &ConditionTable, answers: &Answers, show_all: bool) -> Self {
        let overrides = HashSet::new();
        Self {
            shown: compute_visibility(table, answers, &overrides, show_all),
            overrides,
            show_all,
        }
    }

    /// Whether a target is displayed. Non-targets are always displayed.
    pub fn is_shown(&self, target: &FieldId) -> bool {
        self.shown.get(target).copied().unwrap_or(true)
    }

    /// Whether an entry is displayed: every guard on its path is shown.
    pub fn is_entry_visible(&self, entry: &ListEntry) -> bool {
        entry.guards.iter().all(|g| self.is_shown(g))
    }

    /// Whether show-all mode is on.
    pub fn show_all(&self) -> bool {
        self.show_all
    }

    /// Whether `target` has a manual override.
    pub fn is_overridden(&self, target: &FieldId) -> bool {
        self.overrides.contains(target)
    }

    /// Re-evaluate all targets of `parent`, clearing inputs under newly
    /// hidden targets and cascading to parents among the cleared fields.
    ///
    /// Does nothing while show-all mode is on.
    pub fn evaluate(
        &mut self,
        table: &ConditionTable,
        list: &QuestionList,
        answers: &mut Answers,
        parent: &FieldId,
    ) -> Vec<VisibilityChange> {
        let mut changes = Vec::new();
        if self.show_all || !table.is_parent(parent) {
            return changes;
        }

        let mut pending = VecDeque::from([parent.clone()]);
        let mut done = HashSet::new();
        while let Some(parent) = pending.pop_front() {
            // Conditions only point backwards, so each parent settles in one pass.
            if !done.insert(parent.clone()) {
                continue;
            }
            let selected = answers.selected(&parent).to_vec();
            for entry in table.entries_for(&parent) {
                if self.overrides.contains(&entry.target) {
                    continue;
                }
                let met = entry.is_met_by(&selected);
                if self.is_shown(&entry.target) == met {
                    continue;
                }
                self.shown.insert(entry.target.clone(), met);
                if met {
                    tracing::debug!(target_id = %entry.target, "shown");
                    changes.push(VisibilityChange::Shown(entry.target.clone()));
                    continue;
                }

                let cleared: Vec<FieldId> = list
                    .fields_under(&entry.target)
                    .into_iter()
                    .filter(|field| answers.remove(field).is_some())
                    .collect();
                tracing::debug!(target_id = %entry.target, cleared = cleared.len(), "hidden");
                for field in &cleared {
                    if table.is_parent(field) {
                        done.remove(field);
                        pending.push_back(field.clone());
                    }
                }
                changes.push(VisibilityChange::Hidden {
                    target: entry.target.clone(),
                    cleared,
                });
            }
        }
        changes
    }

    /// Re-evaluate every parent, in declaration order.
    pub fn evaluate_all(
        &mut self,
        table: &ConditionTable,
        list: &QuestionList,
        answers: &mut Answers,
    ) -> Vec<VisibilityChange> {
        let parents: Vec<FieldId> = table.parents().into_iter().cloned().collect();
        parents
            .iter()
            .flat_map(|parent| self.evaluate(table, list, answers, parent))
            .collect()
    }

    /// Flip the manual override of `target`.
    ///
    /// Opening shows the target regardless of its condition. Closing
    /// re-evaluates the condition, which hides and clears the target when it
    /// is not met.
    pub fn toggle_manual(
        &mut self,
        table: &ConditionTable,
        list: &QuestionList,
        answers: &mut Answers,
        target: &FieldId,
    ) -> Vec<VisibilityChange> {
        let Some(entry) = table.entry_for_target(target) else {
            return Vec::new();
        };
        if self.overrides.remove(target) {
            tracing::debug!(target_id = %target, "override closed");
            let parent = entry.parent.clone();
            return self.evaluate(table, list, answers, &parent);
        }
        tracing::debug!(target_id = %target, "override opened");
        self.overrides.insert(target.clone());
        if self.is_shown(target) {
            Vec::new()
        } else {
            self.shown.insert(target.clone(), true);
            vec![VisibilityChange::Shown(target.clone())]
        }
    }

    /// Open the override of every target of `parent` that is not already open.
    pub fn open_branches_for_parent(
        &mut self,
        table: &ConditionTable,
        list: &QuestionList,
        answers: &mut Answers,
        parent: &FieldId,
    ) -> Vec<VisibilityChange> {
        let targets: Vec<FieldId> = table
            .entries_for(parent)
            .map(|e| e.target.clone())
            .filter(|t| !self.overrides.contains(t))
            .collect();
        targets
            .iter()
            .flat_map(|t| self.toggle_manual(table, list, answers, t))
            .collect()
    }

    /// Drop the overrides of every target of `parent` and re-evaluate it.
    pub fn close_branches_for_parent(
        &mut self,
        table: &ConditionTable,
        list: &QuestionList,
        answers: &mut Answers,
        parent: &FieldId,
    ) -> Vec<VisibilityChange> {
        for entry in table.entries_for(parent) {
            self.overrides.remove(&entry.target);
        }
        self.evaluate(table, list, answers, parent)
    }

    /// Switch show-all mode.
    ///
    /// Turning it on shows every target without clearing anything. Turning
    /// it off re-evaluates every parent, hiding and clearing targets whose
    /// conditions are not met.
    pub fn set_show_all(
        &mut self,
        table: &ConditionTable,
        list: &QuestionList,
        answers: &mut Answers,
        on: bool,
    ) -> Vec<VisibilityChange> {
        if self.show_all == on {
            return Vec::new();
        }
        self.show_all = on;
        tracing::debug!(show_all = on, "show-all mode");
        if !on {
            return self.evaluate_all(table, list, answers);
        }
        let mut changes = Vec::new();
        for entry in table.entries() {
            if !self.is_shown(&entry.target) {
                self.shown.insert(entry.target.clone(), true);
                changes.push(VisibilityChange::Shown(entry.target.clone()));
            }
        }
        changes
    }

    /// Targets whose manual override is open although their condition is
    /// not met, in declaration order.
    pub fn forced_override_ids(&self, table: &ConditionTable, answers: &Answers) -> Vec<FieldId> {
        table
            .entries()
            .iter()
            .filter(|e| self.overrides.contains(&e.target))
            .filter(|e| !e.is_met_by(answers.selected(&e.parent)))
            .map(|e| e.target.clone())
            .collect()
    }

    /// Targets displayed although their condition is not met, whether by
    /// override or by show-all mode.
    pub fn forced_targets(&self, table: &ConditionTable, answers: &Answers) -> Vec<FieldId> {
        table
            .entries()
            .iter()
            .filter(|e| self.is_shown(&e.target))
            .filter(|e| !e.is_met_by(answers.selected(&e.parent)))
            .map(|e| e.target.clone())
            .collect()
    }

    /// Open overrides directly, used when restoring a saved record.
    pub fn restore_overrides(&mut self, targets: impl IntoIterator<Item = FieldId>) {
        for target in targets {
            self.shown.insert(target.clone(), true);
            self.overrides.insert(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        table: ConditionTable,
        list: QuestionList,
        answers: Answers,
        state: VisibilityState,
    }

    fn fixture() -> Fixture {
        let questionnaire = example_questionnaires::commute();
        let table = ConditionTable::new(&questionnaire);
        let list = QuestionList::new(&questionnaire, &table);
        let answers = Answers::new();
        let state = VisibilityState::new(&table, &answers, false);
        Fixture {
            table,
            list,
            answers,
            state,
        }
    }

    fn id(s: &str) -> FieldId {
        FieldId::new(s)
    }

    #[test]
    fn targets_start_hidden() {
        let f = fixture();
        assert!(!f.state.is_shown(&id("Q2")));
        assert!(!f.state.is_shown(&id("work")));
        assert!(f.state.is_shown(&id("Q1")));
    }

    #[test]
    fn answer_reveals_target() {
        let mut f = fixture();
        f.answers.insert("Q1", 1u32);
        let changes = f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert_eq!(changes, vec![VisibilityChange::Shown(id("Q2"))]);
        assert!(f.state.is_shown(&id("Q2")));
    }

    #[test]
    fn changing_answer_hides_and_clears() {
        let mut f = fixture();
        f.answers.insert("Q1", 1u32);
        f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        f.answers.insert("Q2", 25i64);

        f.answers.insert("Q1", 2u32);
        let changes = f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(changes.contains(&VisibilityChange::Hidden {
            target: id("Q2"),
            cleared: vec![id("Q2")],
        }));
        assert!(changes.contains(&VisibilityChange::Shown(id("Q3"))));
        assert!(!f.answers.contains(&id("Q2")));
    }

    #[test]
    fn repeated_evaluation_is_idempotent() {
        let mut f = fixture();
        f.answers.insert("Q1", 1u32);
        f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        let again = f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(again.is_empty());
    }

    #[test]
    fn hiding_cascades_through_cleared_parents() {
        let mut f = fixture();
        f.answers.insert("Q1", 2u32);
        f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        f.answers.insert("Q3", crate::AnswerValue::choices([3]));
        f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q3"));
        f.answers.insert("Q3a_hours", 1i64);
        assert!(f.state.is_shown(&id("Q3a")));

        f.answers.insert("Q1", 5u32);
        let changes = f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(!f.answers.contains(&id("Q3")));
        assert!(!f.answers.contains(&id("Q3a_hours")));
        assert!(!f.state.is_shown(&id("Q3a")));
        assert!(changes.iter().any(
            |c| matches!(c, VisibilityChange::Hidden { target, .. } if target.as_str() == "Q3a")
        ));
    }

    #[test]
    fn override_shows_and_closing_clears() {
        let mut f = fixture();
        let changes = f.state.toggle_manual(&f.table, &f.list, &mut f.answers, &id("Q2"));
        assert_eq!(changes, vec![VisibilityChange::Shown(id("Q2"))]);
        f.answers.insert("Q2", 10i64);
        assert_eq!(f.state.forced_override_ids(&f.table, &f.answers), vec![id("Q2")]);

        f.state.toggle_manual(&f.table, &f.list, &mut f.answers, &id("Q2"));
        assert!(!f.state.is_shown(&id("Q2")));
        assert!(!f.answers.contains(&id("Q2")));
        assert!(f.state.forced_override_ids(&f.table, &f.answers).is_empty());
    }

    #[test]
    fn override_survives_parent_changes() {
        let mut f = fixture();
        f.state.toggle_manual(&f.table, &f.list, &mut f.answers, &id("Q2"));
        f.answers.insert("Q1", 4u32);
        f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(f.state.is_shown(&id("Q2")));
    }

    #[test]
    fn branches_for_parent_open_and_close_together() {
        let mut f = fixture();
        f.state
            .open_branches_for_parent(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(f.state.is_shown(&id("Q2")));
        assert!(f.state.is_shown(&id("Q3")));

        f.answers.insert("Q1", 1u32);
        f.state
            .close_branches_for_parent(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(f.state.is_shown(&id("Q2")));
        assert!(!f.state.is_shown(&id("Q3")));
        assert!(!f.state.is_overridden(&id("Q2")));
    }

    #[test]
    fn show_all_keeps_answers_until_turned_off() {
        let mut f = fixture();
        f.state.set_show_all(&f.table, &f.list, &mut f.answers, true);
        assert!(f.state.is_shown(&id("work")));
        f.answers.insert("Q5", "Acme");
        f.answers.insert("Q1", 3u32);
        let changes = f.state.evaluate(&f.table, &f.list, &mut f.answers, &id("Q1"));
        assert!(changes.is_empty());
        assert_eq!(
            f.state.forced_targets(&f.table, &f.answers).first(),
            Some(&id("Q2"))
        );

        f.state.set_show_all(&f.table, &f.list, &mut f.answers, false);
        assert!(!f.state.is_shown(&id("work")));
        assert!(!f.answers.contains(&id("Q5")));
        assert!(f.state.is_shown(&id("Q3")));
    }

    #[test]
    fn pure_computation_matches_state() {
        let mut answers = Answers::new();
        answers.insert("Q1", 1u32);
        answers.insert("Q4", 1u32);
        let questionnaire = example_questionnaires::commute();
        let table = ConditionTable::new(&questionnaire);
        let shown = compute_visibility(&table, &answers, &HashSet::new(), false);
        assert_eq!(shown.get(&id("Q2")), Some(&true));
        assert_eq!(shown.get(&id("Q3")), Some(&false));
        assert_eq!(shown.get(&id("work")), Some(&true));
    }
}
