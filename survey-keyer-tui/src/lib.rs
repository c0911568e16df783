//! # survey-keyer-tui
//!
//! Terminal frontend for survey-keyer.
//!
//! The entry form shows the whole question list at once, greys out hidden
//! questions and keeps the focused question's options on screen, so an
//! operator can key a stack of paper sheets without looking away from
//! them. Digits answer, Tab/Enter move on, and a leading digit that could
//! start a two-digit option number waits briefly for the second digit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use survey_keyer::{MemoryStore, Session, SessionConfig};
//! use survey_keyer_tui::EntryForm;
//!
//! fn main() -> anyhow::Result<()> {
//!     let questionnaire = example_questionnaires::commute();
//!     let mut session = Session::new(&questionnaire, MemoryStore::new(), SessionConfig::default());
//!     EntryForm::new().with_title(&questionnaire.name).run(&mut session)?;
//!     Ok(())
//! }
//! ```
//!
//! The `survey-keyer` binary wraps the form together with CSV export,
//! batch merging and questionnaire checks.

mod backend;
pub mod cli;
mod settings;

pub use backend::{EntryForm, Theme, TuiError};
pub use settings::{SETTINGS_FILE, Settings, SettingsError};
