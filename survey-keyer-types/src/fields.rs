use crate::{FieldId, Question, QuestionKind, ValueKind};

/// One answer field produced by a question: a record key and an export column group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Record key.
    pub id: FieldId,

    /// The question that owns this field.
    pub question: FieldId,

    /// Shape of the stored answer.
    pub kind: ValueKind,

    /// Declared option values (empty for non-choice fields).
    pub options: Vec<u32>,

    /// Whether export expands this field into one column per option.
    pub one_hot: bool,

    /// Header group label.
    pub section: String,

    /// Header title.
    pub title: String,
}

impl FieldSpec {
    fn plain(question: &Question, id: FieldId, kind: ValueKind, title: String) -> Self {
        Self {
            id,
            question: question.id().clone(),
            kind,
            options: Vec::new(),
            one_hot: false,
            section: question.meta().section.clone(),
            title,
        }
    }

    /// Whether this is the free-text field of an "other" option.
    pub fn is_other(&self) -> bool {
        self.id.is_other()
    }
}

/// Suffixes (field suffix, title suffix) of a year-month answer.
pub const YEAR_MONTH_PARTS: [(&str, &str); 2] = [("year", "_年"), ("month", "_月")];

/// Suffixes (field suffix, title suffix) of a Japanese-era date answer.
pub const ERA_DATE_PARTS: [(&str, &str); 4] = [
    ("era", "_元号"),
    ("year", "_年"),
    ("month", "_月"),
    ("day", "_日"),
];

/// Expand a question (without its sub-questions) into its answer fields,
/// in column order.
pub fn answer_fields(question: &Question) -> Vec<FieldSpec> {
    let id = question.id();
    let title = question.column_title().to_string();
    let section = &question.meta().section;

    match question.kind() {
        QuestionKind::SingleChoice(choice) | QuestionKind::MultiChoice(choice) => {
            let kind = if question.kind().is_multi() {
                ValueKind::Multi
            } else {
                ValueKind::Single
            };
            let mut fields = vec![FieldSpec {
                options: choice.options.iter().map(|o| o.value).collect(),
                one_hot: !choice.options.is_empty(),
                ..FieldSpec::plain(question, id.clone(), kind, title)
            }];
            for option in choice.options.iter().filter(|o| o.has_other) {
                fields.push(FieldSpec::plain(
                    question,
                    id.other_for(option.value),
                    ValueKind::Text,
                    String::new(),
                ));
            }
            fields
        }
        QuestionKind::Dropdown(choice) => vec![FieldSpec {
            options: choice.options.iter().map(|o| o.value).collect(),
            ..FieldSpec::plain(question, id.clone(), ValueKind::Single, title)
        }],
        QuestionKind::Scale(_) => vec![FieldSpec {
            options: question.kind().selectable_values(),
            ..FieldSpec::plain(question, id.clone(), ValueKind::Single, title)
        }],
        QuestionKind::MatrixSingle(matrix) | QuestionKind::MatrixMulti(matrix) => {
            let kind = if question.kind().is_multi() {
                ValueKind::Multi
            } else {
                ValueKind::Single
            };
            let values: Vec<u32> = matrix.columns.iter().map(|c| c.value).collect();
            matrix
                .rows
                .iter()
                .map(|row| {
                    let meta = row.meta.as_ref();
                    FieldSpec {
                        id: id.suffixed(&row.id),
                        question: id.clone(),
                        kind,
                        options: values.clone(),
                        one_hot: !values.is_empty(),
                        section: meta
                            .map(|m| m.section.clone())
                            .filter(|s| !s.is_empty())
                            .unwrap_or_else(|| section.clone()),
                        title: meta
                            .and_then(|m| m.title.clone())
                            .unwrap_or_else(|| row.label.clone()),
                    }
                })
                .collect()
        }
        QuestionKind::NumericPair(pair) => pair
            .fields
            .iter()
            .map(|field| {
                let meta = field.meta.as_ref();
                FieldSpec {
                    section: meta
                        .map(|m| m.section.clone())
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| section.clone()),
                    title: meta
                        .and_then(|m| m.title.clone())
                        .unwrap_or_else(|| field.id.to_string()),
                    ..FieldSpec::plain(question, field.id.clone(), ValueKind::Number, String::new())
                }
            })
            .collect(),
        QuestionKind::YearMonth => suffixed_numbers(question, &title, &YEAR_MONTH_PARTS),
        QuestionKind::DateEra => suffixed_numbers(question, &title, &ERA_DATE_PARTS),
        QuestionKind::Numeric(_) => vec![FieldSpec::plain(
            question,
            id.clone(),
            ValueKind::Number,
            title,
        )],
        QuestionKind::ShortText | QuestionKind::LongText | QuestionKind::Date => {
            vec![FieldSpec::plain(question, id.clone(), ValueKind::Text, title)]
        }
    }
}

fn suffixed_numbers(question: &Question, title: &str, parts: &[(&str, &str)]) -> Vec<FieldSpec> {
    parts
        .iter()
        .map(|(suffix, title_suffix)| {
            FieldSpec::plain(
                question,
                question.id().suffixed(suffix),
                ValueKind::Number,
                format!("{title}{title_suffix}"),
            )
        })
        .collect()
}

/// Expand a question and all of its nested sub-questions, depth-first.
pub fn answer_fields_recursive(question: &Question) -> Vec<FieldSpec> {
    let mut fields = answer_fields(question);
    for sub in question.sub_questions() {
        fields.extend(answer_fields_recursive(sub));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChoiceOption, ChoiceQuestion, ColumnMeta, MatrixQuestion, MatrixRow};

    #[test]
    fn radio_with_other_option() {
        let question = Question::new(
            "Q1",
            "Occupation",
            QuestionKind::SingleChoice(ChoiceQuestion::new(vec![
                ChoiceOption::new(1, "office"),
                ChoiceOption::other(2, "other"),
            ])),
        );
        let fields = answer_fields(&question);
        let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["Q1", "Q1_other_2"]);
        assert!(fields[0].one_hot);
        assert_eq!(fields[1].kind, ValueKind::Text);
    }

    #[test]
    fn matrix_rows_become_fields() {
        let question = Question::new(
            "Q5",
            "Satisfaction",
            QuestionKind::MatrixSingle(MatrixQuestion::new(
                vec![MatrixRow::new("a", "Price"), MatrixRow::new("b", "Service")],
                ChoiceQuestion::numbered(["good", "bad"]).options,
            )),
        )
        .with_meta(ColumnMeta::new("問5", "Satisfaction"));
        let fields = answer_fields(&question);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].id.as_str(), "Q5_a");
        assert_eq!(fields[0].title, "Price");
        assert_eq!(fields[1].section, "問5");
        assert_eq!(fields[1].options, vec![1, 2]);
    }

    #[test]
    fn era_date_parts() {
        let question = Question::new("Q9", "Birthday", QuestionKind::DateEra)
            .with_meta(ColumnMeta::new("問9", "生年月日"));
        let titles: Vec<String> = answer_fields(&question)
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(
            titles,
            vec!["生年月日_元号", "生年月日_年", "生年月日_月", "生年月日_日"]
        );
    }

    #[test]
    fn scale_is_a_single_column() {
        let question = Question::new(
            "Q6",
            "Rating",
            QuestionKind::Scale(crate::ScaleQuestion::new(1, 5)),
        );
        let fields = answer_fields(&question);
        assert_eq!(fields.len(), 1);
        assert!(!fields[0].one_hot);
        assert_eq!(fields[0].options, vec![1, 2, 3, 4, 5]);
    }
}
