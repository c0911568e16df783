//! Column layout shared by the record format and the exporter.

use std::collections::HashMap;

use crate::{
    FieldId, FieldSpec, ID_FIELD, OPERATOR_FIELD, Questionnaire, TIMESTAMP_FIELD, ValueKind,
};

const CIRCLE_NUMBERS: [&str; 51] = [
    "⓪", "①", "②", "③", "④", "⑤", "⑥", "⑦", "⑧", "⑨", "⑩", "⑪", "⑫", "⑬", "⑭", "⑮", "⑯", "⑰",
    "⑱", "⑲", "⑳", "㉑", "㉒", "㉓", "㉔", "㉕", "㉖", "㉗", "㉘", "㉙", "㉚", "㉛", "㉜", "㉝", "㉞",
    "㉟", "㊱", "㊲", "㊳", "㊴", "㊵", "㊶", "㊷", "㊸", "㊹", "㊺", "㊻", "㊼", "㊽", "㊾", "㊿",
];

/// Label of an option column in the third header row.
pub fn circle_number(value: u32) -> String {
    CIRCLE_NUMBERS
        .get(value as usize)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("({value})"))
}

/// Label of an "other" text column in the third header row.
pub const OTHER_LABEL: &str = "その他";

/// Title of the identifier column in the second header row.
pub const ID_TITLE: &str = "NO";

/// What an export column holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// The whole cell value of a field (or metadata).
    Plain(String),

    /// `1` when `field` has `value` selected.
    Option { field: FieldId, value: u32 },

    /// Free text of an "other" option.
    Other(FieldId),
}

impl ColumnKind {
    /// Machine key written in the fourth header row.
    pub fn key(&self) -> String {
        match self {
            Self::Plain(key) => key.clone(),
            Self::Option { field, value } => format!("{field}:{value}"),
            Self::Other(field) => field.to_string(),
        }
    }
}

/// A section label spanning a column range (0-based, inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRange {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// The export header: columns plus three human rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderLayout {
    pub columns: Vec<ColumnKind>,
    /// Section names at the first column of each range; `NO` over the id.
    pub sections: Vec<String>,
    /// Field titles at each field's first column.
    pub titles: Vec<String>,
    /// Circled option numbers and `その他` marks.
    pub marks: Vec<String>,
    pub section_ranges: Vec<SectionRange>,
}

impl HeaderLayout {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// The four header rows in output order.
    pub fn rows(&self) -> [Vec<String>; 4] {
        [
            self.sections.clone(),
            self.titles.clone(),
            self.marks.clone(),
            self.columns.iter().map(ColumnKind::key).collect(),
        ]
    }

    fn push(&mut self, column: ColumnKind, title: String, mark: String) {
        self.columns.push(column);
        self.sections.push(String::new());
        self.titles.push(title);
        self.marks.push(mark);
    }
}

/// Field order and per-field metadata of a questionnaire.
#[derive(Debug, Clone, Default)]
pub struct FieldLayout {
    fields: Vec<FieldSpec>,
    by_id: HashMap<FieldId, usize>,
}

impl FieldLayout {
    /// Collect the fields of a questionnaire in declaration order.
    pub fn new(questionnaire: &Questionnaire) -> Self {
        let fields = questionnaire.fields();
        let by_id = fields
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.id.clone(), idx))
            .collect();
        Self { fields, by_id }
    }

    /// Answer fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field.
    pub fn field(&self, id: &FieldId) -> Option<&FieldSpec> {
        self.by_id.get(id).map(|&idx| &self.fields[idx])
    }

    /// Value kind of a field (text for unknown ids).
    pub fn kind_of(&self, id: &FieldId) -> ValueKind {
        self.field(id).map(|f| f.kind).unwrap_or(ValueKind::Text)
    }

    /// Declared option values of a field.
    pub fn option_values(&self, id: &FieldId) -> &[u32] {
        self.field(id).map(|f| f.options.as_slice()).unwrap_or(&[])
    }

    /// Full column order of a record: `ID`, the answer fields, then the
    /// timestamp and operator.
    pub fn field_order(&self) -> Vec<String> {
        std::iter::once(ID_FIELD.to_string())
            .chain(self.fields.iter().map(|f| f.id.to_string()))
            .chain([TIMESTAMP_FIELD.to_string(), OPERATOR_FIELD.to_string()])
            .collect()
    }

    /// Build the multi-row export header.
    ///
    /// One-hot fields expand into one column per option; an option with an
    /// "other" field is followed directly by its text column. A new section
    /// range starts whenever a field's section label changes.
    pub fn header(&self) -> HeaderLayout {
        let mut header = HeaderLayout::default();
        let mut current: Option<(String, usize)> = None;

        header.push(
            ColumnKind::Plain(ID_FIELD.to_string()),
            ID_TITLE.to_string(),
            String::new(),
        );
        for field in self.fields.iter().filter(|f| !f.is_other()) {
            let col = header.width();
            if !field.section.is_empty()
                && current.as_ref().is_none_or(|(name, _)| *name != field.section)
            {
                if let Some((name, start)) = current.take() {
                    header.section_ranges.push(SectionRange {
                        name,
                        start,
                        end: col - 1,
                    });
                }
                current = Some((field.section.clone(), col));
            }

            if !field.one_hot {
                header.push(
                    ColumnKind::Plain(field.id.to_string()),
                    field.title.clone(),
                    String::new(),
                );
                continue;
            }
            for (i, &value) in field.options.iter().enumerate() {
                let title = if i == 0 {
                    field.title.clone()
                } else {
                    String::new()
                };
                header.push(
                    ColumnKind::Option {
                        field: field.id.clone(),
                        value,
                    },
                    title,
                    circle_number(value),
                );
                let other = field.id.other_for(value);
                if self.by_id.contains_key(&other) {
                    header.push(ColumnKind::Other(other), String::new(), OTHER_LABEL.to_string());
                }
            }
        }
        for meta in [TIMESTAMP_FIELD, OPERATOR_FIELD] {
            header.push(
                ColumnKind::Plain(meta.to_string()),
                meta.to_string(),
                String::new(),
            );
        }
        if let Some((name, start)) = current {
            header.section_ranges.push(SectionRange {
                name,
                start,
                end: header.width() - 1,
            });
        }

        header.sections[0] = ID_TITLE.to_string();
        for range in &header.section_ranges {
            header.sections[range.start] = range.name.clone();
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_numbers() {
        assert_eq!(circle_number(0), "⓪");
        assert_eq!(circle_number(12), "⑫");
        assert_eq!(circle_number(21), "㉑");
        assert_eq!(circle_number(50), "㊿");
        assert_eq!(circle_number(51), "(51)");
    }

    #[test]
    fn field_order_wraps_metadata() {
        let layout = FieldLayout::new(&example_questionnaires::commute());
        let order = layout.field_order();
        assert_eq!(order.first().map(String::as_str), Some(ID_FIELD));
        assert_eq!(
            &order[order.len() - 2..],
            &[TIMESTAMP_FIELD.to_string(), OPERATOR_FIELD.to_string()]
        );
        assert!(order.contains(&"Q1_other_9".to_string()));
    }

    #[test]
    fn other_column_follows_its_option() {
        let layout = FieldLayout::new(&example_questionnaires::commute());
        let header = layout.header();
        let option = header
            .columns
            .iter()
            .position(|c| {
                *c == ColumnKind::Option {
                    field: FieldId::new("Q1"),
                    value: 9,
                }
            })
            .unwrap();
        assert_eq!(
            header.columns[option + 1],
            ColumnKind::Other(FieldId::new("Q1_other_9"))
        );
        assert_eq!(header.marks[option], "⑨");
        assert_eq!(header.marks[option + 1], OTHER_LABEL);
    }

    #[test]
    fn titles_sit_on_first_option_column() {
        let layout = FieldLayout::new(&example_questionnaires::commute());
        let header = layout.header();
        let first = header
            .columns
            .iter()
            .position(|c| matches!(c, ColumnKind::Option { field, .. } if field.as_str() == "Q1"))
            .unwrap();
        assert_eq!(first, 1);
        assert!(!header.titles[first].is_empty());
        assert!(header.titles[first + 1].is_empty());
        assert_eq!(header.titles[0], ID_TITLE);
        assert_eq!(header.sections[0], ID_TITLE);
    }

    #[test]
    fn section_ranges_cover_their_columns() {
        let layout = FieldLayout::new(&example_questionnaires::commute());
        let header = layout.header();
        assert!(!header.section_ranges.is_empty());
        assert_eq!(header.section_ranges[0].start, 1);
        for pair in header.section_ranges.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
        let last = header.section_ranges.last().unwrap();
        assert_eq!(last.end, header.width() - 1);
        for range in &header.section_ranges {
            assert_eq!(header.sections[range.start], range.name);
        }
    }

    #[test]
    fn dropdown_stays_a_single_column() {
        let layout = FieldLayout::new(&example_questionnaires::commute());
        let header = layout.header();
        assert!(header.columns.contains(&ColumnKind::Plain("Q7".to_string())));
        assert_eq!(layout.option_values(&FieldId::new("Q7")).len(), 14);
    }
}
