//! Core types for the survey-keyer crate.
//!
//! This crate provides the foundational types for transcribing paper questionnaires:
//! - `Questionnaire`, `Section`, `Question` and `QuestionKind` - The declarative form
//! - `Condition` - Skip logic from a parent answer to a question or section
//! - `FieldSpec` - The answer fields a question expands into
//! - `Answers` and `AnswerValue` - Values held by the entry form
//! - `AnswerRecord` and `RecordStore` - Saved records and their storage

mod field_id;
pub use field_id::FieldId;

mod answer_value;
pub use answer_value::{AnswerValue, ValueKind};

mod answers;
pub use answers::{AnswerError, Answers};

mod condition;
pub use condition::Condition;

mod question;
pub use question::{
    ChoiceOption, ChoiceQuestion, ColumnMeta, MatrixQuestion, MatrixRow, NumericPairQuestion,
    NumericQuestion, Question, QuestionKind, ScaleQuestion, SubField,
};

mod fields;
pub use fields::{
    ERA_DATE_PARTS, FieldSpec, YEAR_MONTH_PARTS, answer_fields, answer_fields_recursive,
};

mod questionnaire;
pub use questionnaire::{Questionnaire, Section};

mod record;
pub use record::{
    AnswerRecord, ID_FIELD, OPERATOR_FIELD, TIMESTAMP_FIELD, TIMESTAMP_FORMAT,
};

mod error;
pub use error::DefinitionError;

mod traits;
pub use traits::RecordStore;
