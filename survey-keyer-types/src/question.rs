use crate::{Condition, FieldId};

/// A single question of a questionnaire.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Unique identifier, also the base of its answer field ids.
    id: FieldId,

    /// The prompt printed on the paper form.
    title: String,

    /// The kind of question (determines input and answer fields).
    kind: QuestionKind,

    /// Shown only when the parent answer matches.
    condition: Option<Condition>,

    /// Nested follow-up questions, navigated right after this one.
    sub_questions: Vec<Question>,

    /// Export header metadata.
    meta: ColumnMeta,
}

impl Question {
    /// Create a new unconditional question.
    pub fn new(id: impl Into<FieldId>, title: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            condition: None,
            sub_questions: Vec::new(),
            meta: ColumnMeta::default(),
        }
    }

    /// Attach a visibility condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Attach nested sub-questions.
    pub fn with_sub_questions(mut self, sub_questions: Vec<Question>) -> Self {
        self.sub_questions = sub_questions;
        self
    }

    /// Set export header metadata.
    pub fn with_meta(mut self, meta: ColumnMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Get the question id.
    pub fn id(&self) -> &FieldId {
        &self.id
    }

    /// Get the prompt text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the question kind.
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    /// Get the visibility condition, if any.
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Get the nested sub-questions.
    pub fn sub_questions(&self) -> &[Question] {
        &self.sub_questions
    }

    /// Get the export header metadata.
    pub fn meta(&self) -> &ColumnMeta {
        &self.meta
    }

    /// Header title: the metadata title, falling back to the id.
    pub fn column_title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Export header metadata (`csvMeta` in questionnaire files).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Group label printed in the first header row.
    pub section: String,

    /// Column title printed in the second header row.
    pub title: Option<String>,
}

impl ColumnMeta {
    /// Create metadata with a section and a title.
    pub fn new(section: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            title: Some(title.into()),
        }
    }
}

/// The kind of question, determining input type and answer fields.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Pick one option (radio buttons).
    SingleChoice(ChoiceQuestion),

    /// Pick any number of options (checkboxes).
    MultiChoice(ChoiceQuestion),

    /// An integer with optional bounds.
    Numeric(NumericQuestion),

    /// Several related integers entered together (e.g. hours and minutes).
    NumericPair(NumericPairQuestion),

    /// Grid of rows, one column choice per row.
    MatrixSingle(MatrixQuestion),

    /// Grid of rows, any number of column choices per row.
    MatrixMulti(MatrixQuestion),

    /// A rating on a numeric scale.
    Scale(ScaleQuestion),

    /// Single-line free text.
    ShortText,

    /// Multi-line free text.
    LongText,

    /// Pick one option from a drop-down list.
    Dropdown(ChoiceQuestion),

    /// Year and month.
    YearMonth,

    /// A calendar date typed as text.
    Date,

    /// A Japanese-era date: era, year, month, day.
    DateEra,
}

impl QuestionKind {
    /// The tag used for this kind in questionnaire files.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::SingleChoice(_) => "radio",
            Self::MultiChoice(_) => "checkbox",
            Self::Numeric(_) => "number",
            Self::NumericPair(_) => "number_pair",
            Self::MatrixSingle(_) => "table",
            Self::MatrixMulti(_) => "table_checkbox",
            Self::Scale(_) => "scale",
            Self::ShortText => "text",
            Self::LongText => "textarea",
            Self::Dropdown(_) => "select",
            Self::YearMonth => "year_month",
            Self::Date => "date",
            Self::DateEra => "date_wareki",
        }
    }

    /// Check if this is a matrix kind, navigated row by row.
    pub fn is_matrix(&self) -> bool {
        matches!(self, Self::MatrixSingle(_) | Self::MatrixMulti(_))
    }

    /// Check if answers are given by option number (digit entry applies).
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::SingleChoice(_)
                | Self::MultiChoice(_)
                | Self::Dropdown(_)
                | Self::Scale(_)
                | Self::MatrixSingle(_)
                | Self::MatrixMulti(_)
        )
    }

    /// Check if one digit commit toggles one of several checked options.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::MultiChoice(_) | Self::MatrixMulti(_))
    }

    /// Number of matrix rows (0 for non-matrix kinds).
    pub fn row_count(&self) -> usize {
        match self {
            Self::MatrixSingle(m) | Self::MatrixMulti(m) => m.rows.len(),
            _ => 0,
        }
    }

    /// Selectable options; matrix kinds return their columns.
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            Self::SingleChoice(c) | Self::MultiChoice(c) | Self::Dropdown(c) => &c.options,
            Self::MatrixSingle(m) | Self::MatrixMulti(m) => &m.columns,
            _ => &[],
        }
    }

    /// Values that digit entry may commit.
    pub fn selectable_values(&self) -> Vec<u32> {
        match self {
            Self::Scale(scale) => (scale.min..=scale.max).collect(),
            _ => self.options().iter().map(|o| o.value).collect(),
        }
    }

    /// The highest selectable value, which drives two-digit disambiguation.
    pub fn max_value(&self) -> Option<u32> {
        match self {
            Self::Scale(scale) => Some(scale.max),
            _ => self.options().iter().map(|o| o.value).max(),
        }
    }
}

/// One option of a choice question or one column of a matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// The number keyed by the operator and stored in records.
    pub value: u32,

    /// Label printed next to the option.
    pub label: String,

    /// Whether choosing this option asks for free-text details.
    pub has_other: bool,
}

impl ChoiceOption {
    /// Create a plain option.
    pub fn new(value: u32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            has_other: false,
        }
    }

    /// Create an option that asks for free-text details ("other: ____").
    pub fn other(value: u32, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            has_other: true,
        }
    }
}

/// Configuration for single, multi and drop-down choice questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceQuestion {
    /// The available options, in printed order.
    pub options: Vec<ChoiceOption>,
}

impl ChoiceQuestion {
    /// Create a choice question with the given options.
    pub fn new(options: Vec<ChoiceOption>) -> Self {
        Self { options }
    }

    /// Create options numbered 1..=n from labels.
    pub fn numbered<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
        let options = labels
            .into_iter()
            .zip(1..)
            .map(|(label, value)| ChoiceOption::new(value, label))
            .collect();
        Self { options }
    }
}

/// Configuration for an integer question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericQuestion {
    /// Optional minimum value.
    pub min: Option<i64>,

    /// Optional maximum value.
    pub max: Option<i64>,

    /// Unit printed after the input box.
    pub unit: Option<String>,
}

impl NumericQuestion {
    /// Create an unbounded numeric question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with bounds.
    pub fn with_bounds(min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            min,
            max,
            unit: None,
        }
    }
}

/// One sub-field of a numeric-pair question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubField {
    /// The answer field id (declared explicitly in the questionnaire).
    pub id: FieldId,

    /// Label printed next to the input box.
    pub label: String,

    /// Export metadata overriding the question's.
    pub meta: Option<ColumnMeta>,
}

impl SubField {
    /// Create a sub-field without own metadata.
    pub fn new(id: impl Into<FieldId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            meta: None,
        }
    }
}

/// Configuration for a numeric-pair question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericPairQuestion {
    /// The sub-fields, in entry order.
    pub fields: Vec<SubField>,
}

impl NumericPairQuestion {
    /// Create with the given sub-fields.
    pub fn new(fields: Vec<SubField>) -> Self {
        Self { fields }
    }
}

/// One row of a matrix question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    /// Row id; the answer field is `{question}_{row}`.
    pub id: String,

    /// Row label; also the default header title.
    pub label: String,

    /// Export metadata overriding the question's.
    pub meta: Option<ColumnMeta>,
}

impl MatrixRow {
    /// Create a row without own metadata.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            meta: None,
        }
    }
}

/// Configuration for a matrix question (rows × shared columns).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixQuestion {
    /// The rows, navigated top to bottom.
    pub rows: Vec<MatrixRow>,

    /// The column choices shared by every row.
    pub columns: Vec<ChoiceOption>,
}

impl MatrixQuestion {
    /// Create a matrix with the given rows and columns.
    pub fn new(rows: Vec<MatrixRow>, columns: Vec<ChoiceOption>) -> Self {
        Self { rows, columns }
    }
}

/// Configuration for a scale question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleQuestion {
    /// Lowest selectable value.
    pub min: u32,

    /// Highest selectable value.
    pub max: u32,

    /// Caption at the low end.
    pub min_label: Option<String>,

    /// Caption at the high end.
    pub max_label: Option<String>,
}

impl ScaleQuestion {
    /// Create a scale with the given bounds.
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max,
            min_label: None,
            max_label: None,
        }
    }
}

impl Default for ScaleQuestion {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_options_start_at_one() {
        let choice = ChoiceQuestion::numbered(["a", "b", "c"]);
        let values: Vec<u32> = choice.options.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn matrix_max_value_comes_from_columns() {
        let kind = QuestionKind::MatrixSingle(MatrixQuestion::new(
            vec![MatrixRow::new("a", "A"), MatrixRow::new("b", "B")],
            ChoiceQuestion::numbered(["yes", "no", "unsure"]).options,
        ));
        assert!(kind.is_matrix());
        assert_eq!(kind.row_count(), 2);
        assert_eq!(kind.max_value(), Some(3));
    }

    #[test]
    fn scale_selectable_values() {
        let kind = QuestionKind::Scale(ScaleQuestion::new(0, 10));
        assert_eq!(kind.max_value(), Some(10));
        assert_eq!(kind.selectable_values().len(), 11);
    }

    #[test]
    fn text_kinds_are_not_choices() {
        assert!(!QuestionKind::ShortText.is_choice());
        assert_eq!(QuestionKind::DateEra.max_value(), None);
    }
}
