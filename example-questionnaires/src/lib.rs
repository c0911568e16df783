//! Bundled questionnaires for demos and tests.

use survey_keyer_types::{
    ChoiceOption, ChoiceQuestion, ColumnMeta, Condition, Question, QuestionKind, Questionnaire,
    ScaleQuestion, Section,
};

/// JSON source of the commute survey.
pub const COMMUTE_JSON: &str = include_str!("../questionnaires/commute.json");

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["commute", "library"];

/// A commuting survey covering every question kind: a radio with an
/// "other" option, conditional questions and a conditional section, a
/// checkbox with a nested conditional sub-question, a matrix, a 14-option
/// drop-down, a scale and the date kinds.
///
/// # Panics
///
/// Panics if the bundled JSON is invalid, which this crate's tests rule out.
pub fn commute() -> Questionnaire {
    match Questionnaire::from_json(COMMUTE_JSON) {
        Ok(questionnaire) => questionnaire,
        Err(err) => panic!("bundled commute questionnaire is invalid: {err}"),
    }
}

/// A short library-visit card, declared in code.
///
/// The satisfaction scale goes up to 10, so `1` waits for a second digit.
///
/// # Panics
///
/// Panics if the declaration is invalid, which this crate's tests rule out.
pub fn library_visit() -> Questionnaire {
    let purpose = Question::new(
        "V1",
        "今日の来館目的",
        QuestionKind::SingleChoice(ChoiceQuestion::new(vec![
            ChoiceOption::new(1, "本の貸出"),
            ChoiceOption::new(2, "返却"),
            ChoiceOption::new(3, "学習"),
            ChoiceOption::new(4, "イベント参加"),
            ChoiceOption::other(5, "その他"),
        ])),
    )
    .with_meta(ColumnMeta::new("問1", "来館目的"));

    let services = Question::new(
        "V2",
        "利用したサービス",
        QuestionKind::MultiChoice(ChoiceQuestion::numbered([
            "レファレンス",
            "コピー",
            "インターネット端末",
            "自習室",
        ])),
    )
    .with_meta(ColumnMeta::new("問2", "サービス"));

    let event_name = Question::new("V3", "参加したイベント", QuestionKind::ShortText)
        .with_meta(ColumnMeta::new("問3", "イベント名"));

    let event_rating = Question::new(
        "V4",
        "イベントの満足度",
        QuestionKind::Scale(ScaleQuestion::new(1, 10)),
    )
    .with_meta(ColumnMeta::new("問4", "イベント満足度"));

    let sections = vec![
        Section::new("visit", "ご来館について", vec![purpose, services]),
        Section::new("event", "イベントについて", vec![event_name, event_rating])
            .with_condition(Condition::new("V1", [4])),
    ];
    match Questionnaire::new("図書館来館者カード", "library-visit", sections) {
        Ok(questionnaire) => questionnaire,
        Err(err) => panic!("library visit questionnaire is invalid: {err}"),
    }
}

/// Look up a bundled questionnaire by name.
pub fn by_name(name: &str) -> Option<Questionnaire> {
    match name {
        "commute" => Some(commute()),
        "library" => Some(library_visit()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_questionnaires_are_valid() {
        let questionnaire = Questionnaire::from_json(COMMUTE_JSON).unwrap();
        assert_eq!(questionnaire.storage_key, "commute-2026");
        assert_eq!(questionnaire.question_count(), 12);
        assert_eq!(library_visit().question_count(), 4);
    }

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert!(by_name(name).is_some(), "{name}");
        }
        assert!(by_name("unknown").is_none());
    }
}
