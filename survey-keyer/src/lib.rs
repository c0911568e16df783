//! # survey-keyer
//!
//! Keyboard-driven transcription of paper questionnaires. Frontend-agnostic.
//!
//! The engine turns operator input into answers and keeps the form
//! consistent with the questionnaire's skip logic:
//!
//! - [`ConditionTable`] and [`VisibilityState`] decide which questions and
//!   sections are shown, clear answers under hidden branches and track
//!   manual overrides and show-all mode.
//! - [`QuestionList`] and [`Cursor`] define where focus goes next, skipping
//!   hidden questions and walking matrix rows.
//! - [`DigitBuffer`] resolves two-digit option numbers without a confirm key.
//! - [`Session`] ties them together behind one `handle(event)` entry point
//!   and saves [`AnswerRecord`]s into a [`RecordStore`].
//! - [`export_csv`] and [`merge_batches`] write the multi-row spreadsheet
//!   header the paper layout expects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use survey_keyer::{Event, MemoryStore, Questionnaire, Session, SessionConfig};
//!
//! let questionnaire = Questionnaire::from_path("commute.json")?;
//! let mut session = Session::new(&questionnaire, MemoryStore::new(), SessionConfig::default());
//!
//! for change in session.handle(Event::Digit(1)) {
//!     println!("{change:?}");
//! }
//! ```
//!
//! ## Frontends
//!
//! - `survey-keyer-tui` - terminal entry form via ratatui, plus the
//!   `survey-keyer` command line tool

// Re-export all types from survey-keyer-types
pub use survey_keyer_types::*;

mod condition_table;
pub use condition_table::{ConditionEntry, ConditionTable};

mod question_list;
pub use question_list::{ListEntry, QuestionList};

mod visibility;
pub use visibility::{VisibilityChange, VisibilityState, compute_visibility};

mod cursor;
pub use cursor::{Cursor, Position, Step};

mod digit_entry;
pub use digit_entry::{DEFAULT_DIGIT_TIMEOUT, DigitBuffer, DigitOutcome};

mod layout;
pub use layout::{
    ColumnKind, FieldLayout, HeaderLayout, ID_TITLE, OTHER_LABEL, SectionRange, circle_number,
};

mod session;
pub use session::{EntryError, Event, Part, Session, SessionConfig, StateChange};

mod store;
pub use store::{JsonFileStore, MemoryStore, StoreError};

mod export;
pub use export::{
    DuplicateId, ExportError, ExportReport, HEADER_ROWS, MergeReport, export_csv,
    export_csv_to_path, merge_batches,
};

// Scripted input for driving a session without a terminal
mod script;
pub use script::Script;
