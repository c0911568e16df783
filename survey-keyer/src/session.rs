//! The entry session: one form being keyed, dispatched through
//! [`Session::handle`].
//!
//! Every input (keystroke, click, timer tick) is an [`Event`]; every
//! observable effect is a [`StateChange`]. Recoverable problems such as a
//! missing identifier or a full store surface as
//! [`StateChange::Rejected`] and never discard the form.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::{
    AnswerRecord, AnswerValue, Answers, ConditionTable, Cursor, DEFAULT_DIGIT_TIMEOUT,
    DigitBuffer, DigitOutcome, FieldId, FieldLayout, ListEntry, Position, QuestionKind,
    QuestionList, Questionnaire, RecordStore, Step, TIMESTAMP_FORMAT, ValueKind, VisibilityChange,
    VisibilityState,
};

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Written into every saved record.
    pub operator: String,

    /// Second-digit window of the digit buffer.
    pub digit_timeout: Duration,

    /// Start with show-all mode on.
    pub show_all: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            operator: String::new(),
            digit_timeout: DEFAULT_DIGIT_TIMEOUT,
            show_all: false,
        }
    }
}

/// Operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A digit key.
    Digit(u8),

    /// A non-digit character for the identifier or a text input.
    Char(char),

    /// Delete the last character, or clear the focused choice.
    Backspace,

    /// Next part, row or question.
    Next,

    /// Previous part, row or question.
    Prev,

    /// Direct focus of a question row (mouse click).
    Focus { index: usize, row: usize },

    /// Direct focus of the identifier input.
    FocusId,

    /// Select an option of the focused question without advancing.
    Select(u32),

    /// Flip the manual override of a conditional target.
    ToggleManual(FieldId),

    /// Open every branch governed by a parent field.
    OpenBranches(FieldId),

    /// Close every branch governed by a parent field.
    CloseBranches(FieldId),

    /// Switch show-all mode.
    SetShowAll(bool),

    /// Commit a pending digit now.
    Flush,

    /// Time passed; commits a pending digit whose window elapsed.
    Tick,

    /// Save the form as a record.
    Save,

    /// Discard the form and start a new record.
    NewRecord,

    /// Load a stored record for editing.
    LoadRecord(usize),

    /// Delete a stored record.
    DeleteRecord(usize),
}

/// Why an input was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    #[error("Enter the record ID first")]
    MissingId,

    #[error("ID '{0}' is already used by another record")]
    DuplicateId(String),

    #[error("{value} is not an option of {field}")]
    InvalidOption { field: FieldId, value: u32 },

    #[error("'{ch}' cannot be typed into {field}")]
    InvalidInput { field: FieldId, ch: char },

    #[error("{value} is out of range for {field}")]
    OutOfRange { field: FieldId, value: i64 },

    #[error("No stored record at index {0}")]
    NoSuchRecord(usize),

    #[error("Stored record {index} cannot be loaded: {reason}")]
    UnreadableRecord { index: usize, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// An observable effect of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// A conditional target became visible.
    Shown(FieldId),

    /// A conditional target became hidden; `cleared` lost their values.
    Hidden {
        target: FieldId,
        cleared: Vec<FieldId>,
    },

    /// A field's answer changed (`None` when cleared).
    AnswerChanged {
        field: FieldId,
        value: Option<AnswerValue>,
    },

    /// The identifier text changed.
    IdChanged(String),

    /// Focus moved.
    CursorMoved(Position),

    /// Focus moved to another part of the focused question.
    PartFocused(usize),

    /// Forward navigation ran past the last visible question.
    ReachedEnd,

    /// A leading digit waits for a second one.
    DigitPending(u8),

    /// A manual override was opened or closed.
    OverrideChanged { target: FieldId, open: bool },

    /// Show-all mode changed.
    ShowAllChanged(bool),

    /// The form was stored.
    Saved {
        index: usize,
        id: String,
        forced: Vec<FieldId>,
        updated: bool,
    },

    /// A stored record was loaded into the form.
    Loaded { index: usize, id: String },

    /// A stored record was deleted.
    Deleted { index: usize, id: String },

    /// The form was emptied for the next record.
    FormReset,

    /// The input was refused; the form is unchanged.
    Rejected(EntryError),
}

impl From<VisibilityChange> for StateChange {
    fn from(change: VisibilityChange) -> Self {
        match change {
            VisibilityChange::Shown(target) => Self::Shown(target),
            VisibilityChange::Hidden { target, cleared } => Self::Hidden { target, cleared },
        }
    }
}

/// One input slot of the focused question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Option selection by digits.
    Choice,

    /// A typed number or text field.
    Input(FieldId),

    /// Free text of a selected "other" option.
    Other(FieldId),
}

/// The entry form over a questionnaire, backed by a record store.
#[derive(Debug)]
pub struct Session<S> {
    list: QuestionList,
    table: ConditionTable,
    layout: FieldLayout,
    visibility: VisibilityState,
    cursor: Cursor,
    part: usize,
    digits: DigitBuffer,
    answers: Answers,
    record_id: String,
    editing: Option<usize>,
    store: S,
    config: SessionConfig,
}

impl<S: RecordStore> Session<S> {
    /// Start a session with an empty form.
    pub fn new(questionnaire: &Questionnaire, store: S, config: SessionConfig) -> Self {
        let table = ConditionTable::new(questionnaire);
        let list = QuestionList::new(questionnaire, &table);
        let layout = FieldLayout::new(questionnaire);
        let answers = Answers::new();
        let visibility = VisibilityState::new(&table, &answers, config.show_all);
        Self {
            list,
            table,
            layout,
            visibility,
            cursor: Cursor::new(),
            part: 0,
            digits: DigitBuffer::new(config.digit_timeout),
            answers,
            record_id: String::new(),
            editing: None,
            store,
            config,
        }
    }

    // === Convenience accessors ===

    /// The flattened question list.
    pub fn list(&self) -> &QuestionList {
        &self.list
    }

    /// The condition table.
    pub fn table(&self) -> &ConditionTable {
        &self.table
    }

    /// The record column layout.
    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    /// The current answers.
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// The identifier being keyed.
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// Index of the stored record being edited, if any.
    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    /// Where focus rests.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// Index of the focused part.
    pub fn part(&self) -> usize {
        self.part
    }

    /// The visibility state.
    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    /// The record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The session settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The buffered leading digit.
    pub fn pending_digit(&self) -> Option<u8> {
        self.digits.pending()
    }

    /// When the buffered digit commits on its own; callers should deliver
    /// [`Event::Tick`] no later than this.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.digits.deadline()
    }

    /// The focused question.
    pub fn focused(&self) -> Option<&ListEntry> {
        self.cursor.position().index().and_then(|i| self.list.get(i))
    }

    /// Whether question `index` is displayed.
    pub fn is_visible(&self, index: usize) -> bool {
        self.list
            .get(index)
            .is_some_and(|e| self.visibility.is_entry_visible(e))
    }

    /// Overridden targets whose real condition is false.
    pub fn forced_override_ids(&self) -> Vec<FieldId> {
        self.visibility.forced_override_ids(&self.table, &self.answers)
    }

    /// Input parts of the focused question.
    pub fn parts(&self) -> Vec<Part> {
        let Some(entry) = self.focused() else {
            return Vec::new();
        };
        if entry.kind.is_matrix() {
            return vec![Part::Choice];
        }
        if !entry.kind.is_choice() {
            return entry
                .fields
                .iter()
                .map(|f| Part::Input(f.id.clone()))
                .collect();
        }
        let mut parts = vec![Part::Choice];
        if let Some(field) = entry.fields.first() {
            let selected = self.answers.selected(&field.id);
            for value in selected {
                let other = field.id.other_for(*value);
                if entry.fields.iter().any(|f| f.id == other) {
                    parts.push(Part::Other(other));
                }
            }
        }
        parts
    }

    // === Dispatch ===

    /// Handle an event at the current time.
    pub fn handle(&mut self, event: Event) -> Vec<StateChange> {
        self.handle_at(event, Instant::now())
    }

    /// Handle an event at `now`.
    ///
    /// A buffered digit whose window has elapsed by `now` is committed
    /// first, as if its timer had fired.
    pub fn handle_at(&mut self, event: Event, now: Instant) -> Vec<StateChange> {
        tracing::trace!(?event, "handle");
        let mut out = Vec::new();
        if let Some(value) = self.digits.expire(now) {
            self.commit(value, true, &mut out);
        }
        match event {
            Event::Digit(digit) => self.on_digit(digit % 10, now, &mut out),
            Event::Char(ch) => self.on_char(ch, now, &mut out),
            Event::Backspace => self.on_backspace(&mut out),
            Event::Next => self.on_next(&mut out),
            Event::Prev => self.on_prev(&mut out),
            Event::Focus { index, row } => {
                self.flush(&mut out);
                if let Step::Moved(position) = self.cursor.focus_row(&self.list, index, row) {
                    self.part = 0;
                    out.push(StateChange::CursorMoved(position));
                }
            }
            Event::FocusId => {
                self.flush(&mut out);
                self.go_to_id(&mut out);
            }
            Event::Select(value) => {
                self.flush(&mut out);
                if self.require_id(&mut out) {
                    self.commit(value, false, &mut out);
                }
            }
            Event::ToggleManual(target) => {
                self.flush(&mut out);
                self.with_overrides(&[target.clone()], &mut out, |s| {
                    s.visibility
                        .toggle_manual(&s.table, &s.list, &mut s.answers, &target)
                });
            }
            Event::OpenBranches(parent) => {
                self.flush(&mut out);
                let targets = self.targets_of(&parent);
                self.with_overrides(&targets, &mut out, |s| {
                    s.visibility
                        .open_branches_for_parent(&s.table, &s.list, &mut s.answers, &parent)
                });
            }
            Event::CloseBranches(parent) => {
                self.flush(&mut out);
                let targets = self.targets_of(&parent);
                self.with_overrides(&targets, &mut out, |s| {
                    s.visibility
                        .close_branches_for_parent(&s.table, &s.list, &mut s.answers, &parent)
                });
            }
            Event::SetShowAll(on) => {
                self.flush(&mut out);
                if self.visibility.show_all() != on {
                    let changes =
                        self.visibility
                            .set_show_all(&self.table, &self.list, &mut self.answers, on);
                    out.push(StateChange::ShowAllChanged(on));
                    self.apply_visibility(changes, &mut out);
                }
            }
            Event::Flush => self.flush(&mut out),
            Event::Tick => {}
            Event::Save => self.save(&mut out),
            Event::NewRecord => {
                self.digits.cancel();
                self.reset_form(&mut out);
            }
            Event::LoadRecord(index) => self.load(index, &mut out),
            Event::DeleteRecord(index) => self.delete(index, &mut out),
        }
        self.clamp_part(&mut out);
        out
    }

    // === Typing ===

    fn on_digit(&mut self, digit: u8, now: Instant, out: &mut Vec<StateChange>) {
        let ch = char::from(b'0' + digit);
        if self.cursor.position() == Position::IdEntry {
            self.digits.cancel();
            self.push_id_char(ch, out);
            return;
        }
        if !self.require_id(out) {
            return;
        }
        match self.parts().get(self.part).cloned() {
            Some(Part::Choice) => {
                let Some(max) = self.focused().and_then(|e| e.kind.max_value()) else {
                    return;
                };
                match self.digits.press(digit, max, now) {
                    DigitOutcome::Commit(value) => self.commit(value, true, out),
                    DigitOutcome::Buffered(d) => out.push(StateChange::DigitPending(d)),
                }
            }
            Some(Part::Input(field) | Part::Other(field)) => self.type_char(field, ch, out),
            None => {}
        }
    }

    fn on_char(&mut self, ch: char, now: Instant, out: &mut Vec<StateChange>) {
        if ch.is_ascii_digit() {
            self.on_digit(ch as u8 - b'0', now, out);
            return;
        }
        if ch.is_control() {
            return;
        }
        if self.cursor.position() == Position::IdEntry {
            self.push_id_char(ch, out);
            return;
        }
        if !self.require_id(out) {
            return;
        }
        if let Some(Part::Input(field) | Part::Other(field)) = self.parts().get(self.part).cloned() {
            self.type_char(field, ch, out);
        }
    }

    fn push_id_char(&mut self, ch: char, out: &mut Vec<StateChange>) {
        self.record_id.push(ch);
        out.push(StateChange::IdChanged(self.record_id.clone()));
    }

    fn type_char(&mut self, field: FieldId, ch: char, out: &mut Vec<StateChange>) {
        match self.layout.kind_of(&field) {
            ValueKind::Number => {
                if !ch.is_ascii_digit() {
                    out.push(StateChange::Rejected(EntryError::InvalidInput { field, ch }));
                    return;
                }
                let mut text = self
                    .answers
                    .get(&field)
                    .map(AnswerValue::to_cell)
                    .unwrap_or_default();
                text.push(ch);
                let Ok(value) = text.parse::<i64>() else {
                    out.push(StateChange::Rejected(EntryError::InvalidInput { field, ch }));
                    return;
                };
                if let Some(max) = self.numeric_max(&field)
                    && value > max
                {
                    out.push(StateChange::Rejected(EntryError::OutOfRange { field, value }));
                    return;
                }
                self.set_answer(field, Some(AnswerValue::Number(value)), out);
            }
            ValueKind::Text => {
                let mut text = self
                    .answers
                    .get(&field)
                    .and_then(AnswerValue::as_text)
                    .unwrap_or_default()
                    .to_string();
                text.push(ch);
                self.set_answer(field, Some(AnswerValue::Text(text)), out);
            }
            ValueKind::Single | ValueKind::Multi => {}
        }
    }

    fn numeric_max(&self, field: &FieldId) -> Option<i64> {
        let entry = self.list.get(self.list.entry_of_field(field)?)?;
        match &entry.kind {
            QuestionKind::Numeric(numeric) => numeric.max,
            _ => None,
        }
    }

    fn on_backspace(&mut self, out: &mut Vec<StateChange>) {
        self.digits.cancel();
        if self.cursor.position() == Position::IdEntry {
            if self.record_id.pop().is_some() {
                out.push(StateChange::IdChanged(self.record_id.clone()));
            }
            return;
        }
        match self.parts().get(self.part).cloned() {
            Some(Part::Choice) => {
                let row = self.cursor.position().row();
                let Some(field) = self
                    .focused()
                    .and_then(|e| e.choice_field(row))
                    .map(|f| f.id.clone())
                else {
                    return;
                };
                self.set_answer(field.clone(), None, out);
                self.clear_deselected_others(&field, out);
            }
            Some(Part::Input(field) | Part::Other(field)) => {
                let Some(mut text) = self.answers.get(&field).map(AnswerValue::to_cell) else {
                    return;
                };
                text.pop();
                let value = match self.layout.kind_of(&field) {
                    ValueKind::Number => text.parse::<i64>().ok().map(AnswerValue::Number),
                    _ => Some(AnswerValue::Text(text)),
                };
                self.set_answer(field, value, out);
            }
            None => {}
        }
    }

    // === Answers ===

    fn require_id(&mut self, out: &mut Vec<StateChange>) -> bool {
        if !self.record_id.trim().is_empty() {
            return true;
        }
        self.digits.cancel();
        out.push(StateChange::Rejected(EntryError::MissingId));
        self.go_to_id(out);
        false
    }

    /// Select `value` on the focused choice field (row field for matrices).
    fn commit(&mut self, value: u32, advance: bool, out: &mut Vec<StateChange>) {
        let row = self.cursor.position().row();
        let Some(spec) = self.focused().and_then(|e| e.choice_field(row)).cloned() else {
            return;
        };
        if !spec.options.contains(&value) {
            out.push(StateChange::Rejected(EntryError::InvalidOption {
                field: spec.id,
                value,
            }));
            return;
        }

        let mut selected = self.answers.selected(&spec.id).to_vec();
        let multi = spec.kind == ValueKind::Multi;
        let new_value = if multi {
            match selected.iter().position(|v| *v == value) {
                Some(pos) => {
                    selected.remove(pos);
                }
                None => selected.push(value),
            }
            Some(AnswerValue::choices(selected))
        } else if selected == [value] {
            None
        } else {
            Some(AnswerValue::Choice(value))
        };
        let is_set = !multi && new_value.is_some();
        self.set_answer(spec.id.clone(), new_value, out);
        self.clear_deselected_others(&spec.id, out);

        if !(is_set && advance) {
            return;
        }
        let other = Part::Other(spec.id.other_for(value));
        if let Some(idx) = self.parts().iter().position(|p| *p == other) {
            self.part = idx;
            out.push(StateChange::PartFocused(idx));
        } else {
            self.advance(out);
        }
    }

    fn set_answer(&mut self, field: FieldId, value: Option<AnswerValue>, out: &mut Vec<StateChange>) {
        let before = self.answers.get(&field).cloned();
        match value {
            Some(value) => {
                self.answers.insert(field.clone(), value);
            }
            None => {
                self.answers.remove(&field);
            }
        }
        let after = self.answers.get(&field).cloned();
        if before == after {
            return;
        }
        out.push(StateChange::AnswerChanged {
            field: field.clone(),
            value: after,
        });
        let changes = self
            .visibility
            .evaluate(&self.table, &self.list, &mut self.answers, &field);
        self.apply_visibility(changes, out);
    }

    fn clear_deselected_others(&mut self, field: &FieldId, out: &mut Vec<StateChange>) {
        let selected = self.answers.selected(field).to_vec();
        let stale: Vec<FieldId> = self
            .answers
            .iter()
            .filter_map(|(id, _)| {
                let (parent, value) = id.other_parent()?;
                (parent == *field && !selected.contains(&value)).then(|| id.clone())
            })
            .collect();
        for id in stale {
            self.set_answer(id, None, out);
        }
    }

    // === Navigation ===

    fn flush(&mut self, out: &mut Vec<StateChange>) {
        if let Some(value) = self.digits.flush() {
            self.commit(value, false, out);
        }
    }

    fn go_to_id(&mut self, out: &mut Vec<StateChange>) {
        self.part = 0;
        if let Step::Moved(position) = self.cursor.reset() {
            out.push(StateChange::CursorMoved(position));
        }
    }

    fn advance(&mut self, out: &mut Vec<StateChange>) {
        let visibility = &self.visibility;
        let list = &self.list;
        let step = self
            .cursor
            .move_next(list, |i| list.get(i).is_some_and(|e| visibility.is_entry_visible(e)));
        match step {
            Step::Moved(position) => {
                self.part = 0;
                out.push(StateChange::CursorMoved(position));
            }
            Step::End => out.push(StateChange::ReachedEnd),
            Step::Unchanged => {}
        }
    }

    fn on_next(&mut self, out: &mut Vec<StateChange>) {
        self.flush(out);
        if self.cursor.position() == Position::IdEntry && self.record_id.trim().is_empty() {
            out.push(StateChange::Rejected(EntryError::MissingId));
            return;
        }
        if self.part + 1 < self.parts().len() {
            self.part += 1;
            out.push(StateChange::PartFocused(self.part));
        } else {
            self.advance(out);
        }
    }

    fn on_prev(&mut self, out: &mut Vec<StateChange>) {
        self.flush(out);
        if self.part > 0 {
            self.part -= 1;
            out.push(StateChange::PartFocused(self.part));
            return;
        }
        let visibility = &self.visibility;
        let list = &self.list;
        let step = self
            .cursor
            .move_prev(list, |i| list.get(i).is_some_and(|e| visibility.is_entry_visible(e)));
        if let Step::Moved(position) = step {
            out.push(StateChange::CursorMoved(position));
            self.part = self.parts().len().saturating_sub(1);
            if self.part > 0 {
                out.push(StateChange::PartFocused(self.part));
            }
        }
    }

    fn settle(&mut self, out: &mut Vec<StateChange>) {
        let visibility = &self.visibility;
        let list = &self.list;
        let step = self
            .cursor
            .settle(list, |i| list.get(i).is_some_and(|e| visibility.is_entry_visible(e)));
        if let Step::Moved(position) = step {
            self.digits.cancel();
            self.part = 0;
            out.push(StateChange::CursorMoved(position));
        }
    }

    fn clamp_part(&mut self, out: &mut Vec<StateChange>) {
        let last = self.parts().len().saturating_sub(1);
        if self.part > last {
            self.part = last;
            out.push(StateChange::PartFocused(last));
        }
    }

    // === Visibility ===

    fn apply_visibility(&mut self, changes: Vec<VisibilityChange>, out: &mut Vec<StateChange>) {
        if changes.is_empty() {
            return;
        }
        out.extend(changes.into_iter().map(StateChange::from));
        self.settle(out);
    }

    fn targets_of(&self, parent: &FieldId) -> Vec<FieldId> {
        self.table
            .entries_for(parent)
            .map(|e| e.target.clone())
            .collect()
    }

    /// Run an override operation and report which of `targets` changed
    /// override state.
    fn with_overrides(
        &mut self,
        targets: &[FieldId],
        out: &mut Vec<StateChange>,
        op: impl FnOnce(&mut Self) -> Vec<VisibilityChange>,
    ) {
        let before: Vec<bool> = targets
            .iter()
            .map(|t| self.visibility.is_overridden(t))
            .collect();
        let changes = op(self);
        for (target, was) in targets.iter().zip(before) {
            let open = self.visibility.is_overridden(target);
            if open != was {
                out.push(StateChange::OverrideChanged {
                    target: target.clone(),
                    open,
                });
            }
        }
        self.apply_visibility(changes, out);
    }

    // === Records ===

    fn forced_fields(&self) -> Vec<FieldId> {
        let forced: HashSet<FieldId> = self
            .visibility
            .forced_targets(&self.table, &self.answers)
            .iter()
            .flat_map(|t| self.list.fields_under(t))
            .collect();
        self.layout
            .fields()
            .iter()
            .filter(|f| forced.contains(&f.id) && self.answers.contains(&f.id))
            .map(|f| f.id.clone())
            .collect()
    }

    /// Build the record the form would save as.
    pub fn build_record(&self) -> AnswerRecord {
        let entered_at = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let mut record = AnswerRecord::new(
            self.record_id.trim(),
            entered_at,
            self.config.operator.clone(),
        );
        for field in self.layout.fields() {
            let cell = self
                .answers
                .get(&field.id)
                .map(AnswerValue::to_cell)
                .unwrap_or_default();
            record.values.insert(field.id.clone(), cell);
        }
        record.forced = self.forced_fields();
        record
    }

    fn save(&mut self, out: &mut Vec<StateChange>) {
        self.flush(out);
        let id = self.record_id.trim().to_string();
        if id.is_empty() {
            out.push(StateChange::Rejected(EntryError::MissingId));
            self.go_to_id(out);
            return;
        }
        if self.store.is_duplicate_id(&id, self.editing) {
            tracing::warn!(%id, "save rejected: duplicate id");
            out.push(StateChange::Rejected(EntryError::DuplicateId(id)));
            return;
        }

        let record = self.build_record();
        let forced = record.forced.clone();
        let result = match self.editing {
            Some(index) => self.store.update(index, record).map(|()| (index, true)),
            None => self.store.add(record).map(|index| (index, false)),
        };
        match result {
            Ok((index, updated)) => {
                tracing::info!(%id, index, updated, "record saved");
                if !forced.is_empty() {
                    tracing::warn!(%id, fields = ?forced, "record saved with forced answers");
                }
                out.push(StateChange::Saved {
                    index,
                    id,
                    forced,
                    updated,
                });
                self.reset_form(out);
            }
            Err(err) => {
                let err: anyhow::Error = err.into();
                tracing::error!(%id, error = %err, "record not saved");
                out.push(StateChange::Rejected(EntryError::Storage(format!("{err:#}"))));
            }
        }
    }

    fn reset_form(&mut self, out: &mut Vec<StateChange>) {
        self.answers.clear();
        self.record_id.clear();
        self.editing = None;
        self.visibility =
            VisibilityState::new(&self.table, &self.answers, self.visibility.show_all());
        out.push(StateChange::FormReset);
        self.go_to_id(out);
    }

    fn load(&mut self, index: usize, out: &mut Vec<StateChange>) {
        self.digits.cancel();
        let Some(record) = self.store.get(index).cloned() else {
            out.push(StateChange::Rejected(EntryError::NoSuchRecord(index)));
            return;
        };
        let mut answers = Answers::new();
        for (field, cell) in &record.values {
            let Some(spec) = self.layout.field(field) else {
                tracing::warn!(%field, "ignoring unknown field in stored record");
                continue;
            };
            match AnswerValue::parse_cell(field, spec.kind, cell) {
                Ok(Some(value)) => {
                    answers.insert(field.clone(), value);
                }
                Ok(None) => {}
                Err(err) => {
                    out.push(StateChange::Rejected(EntryError::UnreadableRecord {
                        index,
                        reason: err.to_string(),
                    }));
                    return;
                }
            }
        }

        self.reset_form(out);
        self.answers = answers;
        self.record_id = record.id.clone();
        self.editing = Some(index);
        self.visibility =
            VisibilityState::new(&self.table, &self.answers, self.visibility.show_all());
        // Answers under unmet conditions were keyed through a forced branch;
        // reopen it so they stay visible.
        let reopen: Vec<FieldId> = self
            .table
            .entries()
            .iter()
            .filter(|e| !e.is_met_by(self.answers.selected(&e.parent)))
            .filter(|e| {
                self.list
                    .fields_under(&e.target)
                    .iter()
                    .any(|f| self.answers.contains(f))
            })
            .map(|e| e.target.clone())
            .collect();
        self.visibility.restore_overrides(reopen);
        tracing::info!(id = %record.id, index, "record loaded");
        out.push(StateChange::IdChanged(self.record_id.clone()));
        out.push(StateChange::Loaded {
            index,
            id: record.id,
        });
    }

    fn delete(&mut self, index: usize, out: &mut Vec<StateChange>) {
        if index >= self.store.count() {
            out.push(StateChange::Rejected(EntryError::NoSuchRecord(index)));
            return;
        }
        match self.store.delete(index) {
            Ok(record) => {
                tracing::info!(id = %record.id, index, "record deleted");
                out.push(StateChange::Deleted {
                    index,
                    id: record.id,
                });
                match self.editing {
                    Some(editing) if editing == index => {
                        self.digits.cancel();
                        self.reset_form(out);
                    }
                    Some(editing) if editing > index => self.editing = Some(editing - 1),
                    _ => {}
                }
            }
            Err(err) => {
                let err: anyhow::Error = err.into();
                out.push(StateChange::Rejected(EntryError::Storage(format!("{err:#}"))));
            }
        }
    }
}
