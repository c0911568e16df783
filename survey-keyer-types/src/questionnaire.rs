use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::{
    ChoiceOption, ChoiceQuestion, ColumnMeta, Condition, DefinitionError, FieldId, FieldSpec,
    MatrixQuestion, MatrixRow, NumericPairQuestion, NumericQuestion, Question, QuestionKind,
    ScaleQuestion, SubField, ValueKind, answer_fields, answer_fields_recursive,
};

/// A titled group of questions, optionally shown only under a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Identifier used as a condition target.
    pub id: FieldId,

    /// Heading printed above the questions.
    pub title: String,

    /// Shown only when the parent answer matches.
    pub condition: Option<Condition>,

    /// Questions of this section, in printed order.
    pub questions: Vec<Question>,
}

impl Section {
    /// Create an unconditional section.
    pub fn new(id: impl Into<FieldId>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            condition: None,
            questions,
        }
    }

    /// Attach a visibility condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// The top-level structure of a paper questionnaire.
///
/// Built once at load time and never mutated afterwards; the entry engine
/// borrows it for the whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct Questionnaire {
    /// Display name, also used in export file names.
    pub name: String,

    /// Key under which records are stored.
    pub storage_key: String,

    /// Sections in printed order.
    pub sections: Vec<Section>,
}

impl Questionnaire {
    /// Create and validate a questionnaire.
    pub fn new(
        name: impl Into<String>,
        storage_key: impl Into<String>,
        sections: Vec<Section>,
    ) -> Result<Self, DefinitionError> {
        let questionnaire = Self {
            name: name.into(),
            storage_key: storage_key.into(),
            sections,
        };
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    /// Parse and validate a questionnaire from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let raw: RawQuestionnaire = serde_json::from_str(json)?;
        let sections = raw
            .sections
            .into_iter()
            .enumerate()
            .map(|(idx, section)| section.into_section(idx))
            .collect::<Result<Vec<_>, _>>()?;
        let storage_key = raw.storage_key.unwrap_or_else(|| raw.survey_name.clone());
        Self::new(raw.survey_name, storage_key, sections)
    }

    /// Read, parse and validate a questionnaire file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Get the sections.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All answer fields in declaration order (sections, then questions depth-first).
    pub fn fields(&self) -> Vec<FieldSpec> {
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter())
            .flat_map(answer_fields_recursive)
            .collect()
    }

    /// Total number of questions, including nested ones.
    pub fn question_count(&self) -> usize {
        fn count(questions: &[Question]) -> usize {
            questions
                .iter()
                .map(|q| 1 + count(q.sub_questions()))
                .sum()
        }
        self.sections.iter().map(|s| count(&s.questions)).sum()
    }

    /// Check ids, option lists and conditions.
    ///
    /// Conditions may only refer to choice fields declared before their target,
    /// which keeps the dependency graph acyclic.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let all_fields: HashSet<FieldId> = self.fields().into_iter().map(|f| f.id).collect();
        let mut validator = Validator {
            all_fields,
            seen_fields: HashMap::new(),
            ids: HashSet::new(),
        };
        for section in &self.sections {
            validator.claim_id(section.id.as_str())?;
            if let Some(condition) = &section.condition {
                validator.check_condition(section.id.as_str(), condition)?;
            }
            for question in &section.questions {
                validator.check_question(question)?;
            }
        }
        Ok(())
    }
}

struct Validator {
    all_fields: HashSet<FieldId>,
    seen_fields: HashMap<FieldId, ValueKind>,
    ids: HashSet<String>,
}

impl Validator {
    fn claim_id(&mut self, id: &str) -> Result<(), DefinitionError> {
        if self.ids.insert(id.to_string()) {
            Ok(())
        } else {
            Err(DefinitionError::DuplicateId(id.to_string()))
        }
    }

    fn check_condition(&self, target: &str, condition: &Condition) -> Result<(), DefinitionError> {
        if condition.values.is_empty() {
            return Err(DefinitionError::EmptyTrigger(target.to_string()));
        }
        let parent = condition.parent.to_string();
        match self.seen_fields.get(&condition.parent) {
            Some(ValueKind::Single | ValueKind::Multi) => Ok(()),
            Some(_) => Err(DefinitionError::ParentNotChoice {
                target: target.to_string(),
                parent,
            }),
            None if self.all_fields.contains(&condition.parent) => {
                Err(DefinitionError::ForwardReference {
                    target: target.to_string(),
                    parent,
                })
            }
            None => Err(DefinitionError::UnknownParent {
                target: target.to_string(),
                parent,
            }),
        }
    }

    fn check_question(&mut self, question: &Question) -> Result<(), DefinitionError> {
        let id = question.id().to_string();
        self.claim_id(&id)?;
        match question.kind() {
            QuestionKind::SingleChoice(c) | QuestionKind::MultiChoice(c) | QuestionKind::Dropdown(c)
                if c.options.is_empty() =>
            {
                return Err(DefinitionError::NoOptions(id));
            }
            QuestionKind::MatrixSingle(m) | QuestionKind::MatrixMulti(m)
                if m.rows.is_empty() || m.columns.is_empty() =>
            {
                return Err(DefinitionError::EmptyMatrix(id));
            }
            QuestionKind::NumericPair(p) if p.fields.is_empty() => {
                return Err(DefinitionError::NoOptions(id));
            }
            QuestionKind::Scale(s) if s.min > s.max => {
                return Err(DefinitionError::ScaleBounds {
                    question: id,
                    min: i64::from(s.min),
                    max: i64::from(s.max),
                });
            }
            _ => {}
        }
        if let Some(condition) = question.condition() {
            self.check_condition(&id, condition)?;
        }
        for field in answer_fields(question) {
            if field.id.as_str() != id {
                self.claim_id(field.id.as_str())?;
            }
            self.seen_fields.insert(field.id, field.kind);
        }
        for sub in question.sub_questions() {
            self.check_question(sub)?;
        }
        Ok(())
    }
}

// === Questionnaire file format ===

fn default_survey_name() -> String {
    "survey".to_string()
}

fn default_question_type() -> String {
    "radio".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestionnaire {
    #[serde(default = "default_survey_name")]
    survey_name: String,
    #[serde(default)]
    storage_key: Option<String>,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    condition: Option<RawCondition>,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

impl RawSection {
    fn into_section(self, idx: usize) -> Result<Section, DefinitionError> {
        let id = self.id.unwrap_or_else(|| format!("section{}", idx + 1));
        let questions = self
            .questions
            .into_iter()
            .map(RawQuestion::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Section {
            id: FieldId::new(id),
            title: self.title,
            condition: self.condition.map(RawCondition::into_condition),
            questions,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    parent: String,
    values: Vec<u32>,
}

impl RawCondition {
    fn into_condition(self) -> Condition {
        Condition::new(self.parent, self.values)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOption {
    value: u32,
    #[serde(default)]
    label: String,
    #[serde(default)]
    has_other: bool,
}

impl From<RawOption> for ChoiceOption {
    fn from(raw: RawOption) -> Self {
        Self {
            value: raw.value,
            label: raw.label,
            has_other: raw.has_other,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMeta {
    #[serde(default)]
    section: String,
    #[serde(default)]
    title: Option<String>,
}

impl From<RawMeta> for ColumnMeta {
    fn from(raw: RawMeta) -> Self {
        Self {
            section: raw.section,
            title: raw.title,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubField {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    csv_meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRow {
    id: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    csv_meta: Option<RawMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: String,
    #[serde(rename = "type", default = "default_question_type")]
    kind: String,
    #[serde(default, alias = "text", alias = "label")]
    title: String,
    #[serde(default)]
    options: Vec<RawOption>,
    #[serde(default)]
    csv_meta: Option<RawMeta>,
    #[serde(default)]
    condition: Option<RawCondition>,
    #[serde(default)]
    sub_questions: Vec<RawQuestion>,
    #[serde(default)]
    fields: Vec<RawSubField>,
    #[serde(default)]
    rows: Vec<RawRow>,
    #[serde(default)]
    columns: Vec<RawOption>,
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    max: Option<i64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    min_label: Option<String>,
    #[serde(default)]
    max_label: Option<String>,
}

impl RawQuestion {
    fn into_question(self) -> Result<Question, DefinitionError> {
        let kind = match self.kind.as_str() {
            "radio" => QuestionKind::SingleChoice(ChoiceQuestion::new(convert(self.options))),
            "checkbox" => QuestionKind::MultiChoice(ChoiceQuestion::new(convert(self.options))),
            "select" => QuestionKind::Dropdown(ChoiceQuestion::new(convert(self.options))),
            "number" => QuestionKind::Numeric(NumericQuestion {
                min: self.min,
                max: self.max,
                unit: self.unit,
            }),
            "number_pair" => QuestionKind::NumericPair(NumericPairQuestion::new(
                self.fields
                    .into_iter()
                    .map(|f| SubField {
                        id: FieldId::new(f.id),
                        label: f.label,
                        meta: f.csv_meta.map(ColumnMeta::from),
                    })
                    .collect(),
            )),
            "table" | "table_checkbox" => {
                let matrix = MatrixQuestion::new(
                    self.rows
                        .into_iter()
                        .map(|r| MatrixRow {
                            id: r.id,
                            label: r.label,
                            meta: r.csv_meta.map(ColumnMeta::from),
                        })
                        .collect(),
                    convert(self.columns),
                );
                if self.kind == "table" {
                    QuestionKind::MatrixSingle(matrix)
                } else {
                    QuestionKind::MatrixMulti(matrix)
                }
            }
            "scale" => {
                let min = self.min.unwrap_or(1);
                let max = self.max.unwrap_or(5);
                let bounds = u32::try_from(min).ok().zip(u32::try_from(max).ok());
                let Some((lo, hi)) = bounds.filter(|(lo, hi)| lo <= hi) else {
                    return Err(DefinitionError::ScaleBounds {
                        question: self.id,
                        min,
                        max,
                    });
                };
                QuestionKind::Scale(ScaleQuestion {
                    min: lo,
                    max: hi,
                    min_label: self.min_label,
                    max_label: self.max_label,
                })
            }
            "text" => QuestionKind::ShortText,
            "textarea" => QuestionKind::LongText,
            "year_month" => QuestionKind::YearMonth,
            "date" => QuestionKind::Date,
            "date_wareki" => QuestionKind::DateEra,
            other => {
                return Err(DefinitionError::UnknownType {
                    question: self.id,
                    tag: other.to_string(),
                });
            }
        };
        let sub_questions = self
            .sub_questions
            .into_iter()
            .map(RawQuestion::into_question)
            .collect::<Result<Vec<_>, _>>()?;
        let mut question = Question::new(self.id, self.title, kind).with_sub_questions(sub_questions);
        if let Some(meta) = self.csv_meta {
            question = question.with_meta(meta.into());
        }
        if let Some(condition) = self.condition {
            question = question.with_condition(condition.into_condition());
        }
        Ok(question)
    }
}

fn convert(options: Vec<RawOption>) -> Vec<ChoiceOption> {
    options.into_iter().map(ChoiceOption::from).collect()
}
