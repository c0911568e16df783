//! Scripted input for driving a session without a terminal.
//!
//! `Script` replays operator keystrokes against a [`Session`] on a
//! controlled clock, so digit-buffer timing can be tested deterministically.
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_keyer::{MemoryStore, Script, Session, SessionConfig};
//!
//! let mut session = Session::new(&questionnaire, MemoryStore::new(), SessionConfig::default());
//! let changes = Script::new()
//!     .id("0001")
//!     .next()
//!     .digits("1")
//!     .wait_ms(600)
//!     .save()
//!     .run(&mut session);
//! ```

use std::time::{Duration, Instant};

use crate::{Event, RecordStore, Session, StateChange};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptStep {
    Event(Event),
    Wait(Duration),
}

/// A sequence of events and pauses.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append any event.
    pub fn event(mut self, event: Event) -> Self {
        self.steps.push(ScriptStep::Event(event));
        self
    }

    /// Type the record identifier (focus must be on identifier entry).
    pub fn id(self, id: &str) -> Self {
        self.text(id)
    }

    /// Type characters one by one; digits become digit presses.
    pub fn text(mut self, text: &str) -> Self {
        for ch in text.chars() {
            let event = match ch.to_digit(10) {
                Some(d) => Event::Digit(d as u8),
                None => Event::Char(ch),
            };
            self.steps.push(ScriptStep::Event(event));
        }
        self
    }

    /// Press digit keys back to back, within the second-digit window.
    pub fn digits(self, digits: &str) -> Self {
        self.text(digits)
    }

    /// Press Tab.
    pub fn next(self) -> Self {
        self.event(Event::Next)
    }

    /// Press Shift-Tab.
    pub fn prev(self) -> Self {
        self.event(Event::Prev)
    }

    /// Save the form.
    pub fn save(self) -> Self {
        self.event(Event::Save)
    }

    /// Let time pass, then deliver a tick.
    pub fn wait(mut self, duration: Duration) -> Self {
        self.steps.push(ScriptStep::Wait(duration));
        self
    }

    /// Let `ms` milliseconds pass, then deliver a tick.
    pub fn wait_ms(self, ms: u64) -> Self {
        self.wait(Duration::from_millis(ms))
    }

    /// Replay the script starting now.
    pub fn run<S: RecordStore>(&self, session: &mut Session<S>) -> Vec<StateChange> {
        self.run_from(session, Instant::now())
    }

    /// Replay the script on a clock starting at `start`. Events take no time.
    pub fn run_from<S: RecordStore>(
        &self,
        session: &mut Session<S>,
        start: Instant,
    ) -> Vec<StateChange> {
        let mut clock = start;
        let mut changes = Vec::new();
        for step in &self.steps {
            match step {
                ScriptStep::Event(event) => changes.extend(session.handle_at(event.clone(), clock)),
                ScriptStep::Wait(duration) => {
                    clock += *duration;
                    changes.extend(session.handle_at(Event::Tick, clock));
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, Position, SessionConfig};

    #[test]
    fn script_types_identifier() {
        let questionnaire = example_questionnaires::commute();
        let mut session = Session::new(&questionnaire, MemoryStore::new(), SessionConfig::default());
        let changes = Script::new().id("A7").run(&mut session);
        assert_eq!(session.record_id(), "A7");
        assert_eq!(changes.last(), Some(&StateChange::IdChanged("A7".to_string())));
        assert_eq!(session.position(), Position::IdEntry);
    }

    #[test]
    fn wait_delivers_tick() {
        let questionnaire = example_questionnaires::commute();
        let mut session = Session::new(&questionnaire, MemoryStore::new(), SessionConfig::default());
        let q7 = session
            .list()
            .index_of(&crate::FieldId::new("Q7"))
            .unwrap();
        Script::new()
            .id("1")
            .event(Event::Focus { index: q7, row: 0 })
            .digits("1")
            .wait_ms(501)
            .run(&mut session);
        assert_eq!(session.answers().get_choice(&"Q7".into()).unwrap(), 1);
    }
}
