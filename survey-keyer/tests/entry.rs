//! End-to-end entry flows through `Session::handle_at`.

use std::time::{Duration, Instant};

use survey_keyer::{
    AnswerValue, EntryError, Event, FieldId, JsonFileStore, MemoryStore, Position, Questionnaire,
    RecordStore, Script, Session, SessionConfig, StateChange,
};

fn config() -> SessionConfig {
    SessionConfig {
        operator: "tester".to_string(),
        ..SessionConfig::default()
    }
}

fn commute_session() -> Session<MemoryStore> {
    Session::new(
        &example_questionnaires::commute(),
        MemoryStore::new(),
        config(),
    )
}

fn id(s: &str) -> FieldId {
    FieldId::new(s)
}

fn at(index: usize) -> Position {
    Position::AtQuestion { index, row: 0 }
}

/// Type a record id and move to the first question.
fn start<S: RecordStore>(session: &mut Session<S>, record_id: &str) {
    Script::new().id(record_id).next().run(session);
    assert_eq!(session.position(), at(0));
}

fn press<S: RecordStore>(session: &mut Session<S>, event: Event) -> Vec<StateChange> {
    session.handle(event)
}

#[test]
fn digit_without_id_is_rejected() {
    let mut session = commute_session();
    press(&mut session, Event::Focus { index: 0, row: 0 });
    let changes = press(&mut session, Event::Digit(1));
    assert_eq!(
        changes,
        vec![
            StateChange::Rejected(EntryError::MissingId),
            StateChange::CursorMoved(Position::IdEntry),
        ]
    );
    assert!(session.answers().is_empty());
}

#[test]
fn leaving_id_entry_needs_an_id() {
    let mut session = commute_session();
    let changes = press(&mut session, Event::Next);
    assert_eq!(changes, vec![StateChange::Rejected(EntryError::MissingId)]);
    assert_eq!(session.position(), Position::IdEntry);
}

#[test]
fn answers_reveal_and_skip() {
    let mut session = commute_session();
    start(&mut session, "0001");

    let changes = press(&mut session, Event::Digit(1));
    assert!(changes.contains(&StateChange::Shown(id("Q2"))));
    assert_eq!(changes.last(), Some(&StateChange::CursorMoved(at(1))));

    Script::new().digits("25").run(&mut session);
    assert_eq!(session.answers().get_number(&id("Q2")).unwrap(), 25);

    // Q3 and its sub-question stay hidden.
    press(&mut session, Event::Next);
    assert_eq!(session.position(), at(4));

    // Answering "no" keeps the work section hidden.
    press(&mut session, Event::Digit(2));
    assert_eq!(session.position(), at(7));
}

#[test]
fn changing_parent_clears_hidden_answers() {
    let mut session = commute_session();
    start(&mut session, "0001");
    Script::new().digits("1").digits("42").run(&mut session);
    assert!(session.answers().contains(&id("Q2")));

    press(&mut session, Event::Focus { index: 0, row: 0 });
    let changes = press(&mut session, Event::Digit(2));
    assert!(changes.contains(&StateChange::Hidden {
        target: id("Q2"),
        cleared: vec![id("Q2")],
    }));
    assert!(changes.contains(&StateChange::Shown(id("Q3"))));
    assert!(!session.answers().contains(&id("Q2")));
    assert_eq!(session.position(), at(2));
}

#[test]
fn selecting_the_same_value_deselects() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(4));
    press(&mut session, Event::Focus { index: 0, row: 0 });

    let changes = press(&mut session, Event::Digit(4));
    assert!(changes.contains(&StateChange::AnswerChanged {
        field: id("Q1"),
        value: None,
    }));
    assert_eq!(session.position(), at(0));
}

#[test]
fn undeclared_option_is_rejected() {
    let mut session = commute_session();
    start(&mut session, "0001");
    let changes = press(&mut session, Event::Digit(7));
    assert_eq!(
        changes,
        vec![StateChange::Rejected(EntryError::InvalidOption {
            field: id("Q1"),
            value: 7,
        })]
    );
    assert!(session.answers().is_empty());
}

#[test]
fn other_option_asks_for_details() {
    let mut session = commute_session();
    start(&mut session, "0001");

    let changes = press(&mut session, Event::Digit(9));
    assert_eq!(changes.last(), Some(&StateChange::PartFocused(1)));
    Script::new().text("tram").next().run(&mut session);
    assert_eq!(
        session.answers().get_text(&id("Q1_other_9")).unwrap(),
        "tram"
    );
    assert_eq!(session.position(), at(4));

    press(&mut session, Event::Focus { index: 0, row: 0 });
    let changes = press(&mut session, Event::Digit(1));
    assert!(changes.contains(&StateChange::AnswerChanged {
        field: id("Q1_other_9"),
        value: None,
    }));
}

#[test]
fn multi_choice_and_nested_parts() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(2));
    assert_eq!(session.position(), at(2));

    // Checkbox toggles never advance.
    press(&mut session, Event::Digit(1));
    let changes = press(&mut session, Event::Digit(3));
    assert!(changes.contains(&StateChange::Shown(id("Q3a"))));
    assert_eq!(session.position(), at(2));
    assert_eq!(session.answers().get_choices(&id("Q3")).unwrap(), &[1, 3]);

    Script::new()
        .next()
        .digits("1")
        .next()
        .digits("20")
        .run(&mut session);
    assert_eq!(session.answers().get_number(&id("Q3a_hours")).unwrap(), 1);
    assert_eq!(session.answers().get_number(&id("Q3a_minutes")).unwrap(), 20);

    press(&mut session, Event::Next);
    assert_eq!(session.position(), at(4));
    let changes = press(&mut session, Event::Prev);
    assert_eq!(
        changes,
        vec![StateChange::CursorMoved(at(3)), StateChange::PartFocused(1)]
    );

    press(&mut session, Event::Focus { index: 2, row: 0 });
    let changes = press(&mut session, Event::Digit(3));
    assert!(changes.contains(&StateChange::Hidden {
        target: id("Q3a"),
        cleared: vec![id("Q3a_hours"), id("Q3a_minutes")],
    }));
}

#[test]
fn matrix_rows_and_section_clearing() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(5));
    let changes = press(&mut session, Event::Digit(1));
    assert!(changes.contains(&StateChange::Shown(id("work"))));
    assert_eq!(session.position(), at(5));

    press(&mut session, Event::Next);
    assert_eq!(session.position(), at(6));
    press(&mut session, Event::Digit(2));
    assert_eq!(session.position(), Position::AtQuestion { index: 6, row: 1 });
    Script::new().digits("3").digits("4").run(&mut session);
    assert_eq!(session.position(), at(7));
    assert_eq!(session.answers().get_choice(&id("Q6_c")).unwrap(), 4);

    press(&mut session, Event::Prev);
    assert_eq!(session.position(), Position::AtQuestion { index: 6, row: 2 });

    press(&mut session, Event::Focus { index: 4, row: 0 });
    let changes = press(&mut session, Event::Digit(2));
    assert!(changes.contains(&StateChange::Hidden {
        target: id("work"),
        cleared: vec![id("Q6_a"), id("Q6_b"), id("Q6_c")],
    }));
}

#[test]
fn backspace_edits_typed_numbers() {
    let mut session = commute_session();
    start(&mut session, "0001");
    Script::new().digits("1").digits("25").run(&mut session);

    press(&mut session, Event::Backspace);
    assert_eq!(session.answers().get_number(&id("Q2")).unwrap(), 2);
    press(&mut session, Event::Backspace);
    assert!(!session.answers().contains(&id("Q2")));
}

#[test]
fn number_above_maximum_is_rejected() {
    let mut session = commute_session();
    start(&mut session, "0001");
    Script::new().digits("1").digits("300").run(&mut session);
    let changes = press(&mut session, Event::Digit(0));
    assert_eq!(
        changes,
        vec![StateChange::Rejected(EntryError::OutOfRange {
            field: id("Q2"),
            value: 3000,
        })]
    );
    assert_eq!(session.answers().get_number(&id("Q2")).unwrap(), 300);
}

#[test]
fn save_resets_the_form() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(3));

    let changes = press(&mut session, Event::Save);
    assert_eq!(
        changes,
        vec![
            StateChange::Saved {
                index: 0,
                id: "0001".to_string(),
                forced: vec![],
                updated: false,
            },
            StateChange::FormReset,
            StateChange::CursorMoved(Position::IdEntry),
        ]
    );
    assert!(session.answers().is_empty());
    assert_eq!(session.record_id(), "");

    let record = session.store().get(0).unwrap();
    assert_eq!(record.value(&id("Q1")), "3");
    assert_eq!(record.value(&id("Q2")), "");
    assert_eq!(record.operator, "tester");
    assert_eq!(record.values.len(), session.layout().fields().len());
}

#[test]
fn duplicate_id_keeps_the_form() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(3));
    press(&mut session, Event::Save);

    start(&mut session, "0001");
    press(&mut session, Event::Digit(1));
    let changes = press(&mut session, Event::Save);
    assert_eq!(
        changes,
        vec![StateChange::Rejected(EntryError::DuplicateId(
            "0001".to_string()
        ))]
    );
    assert_eq!(session.answers().get_choice(&id("Q1")).unwrap(), 1);
    assert_eq!(session.record_id(), "0001");
    assert_eq!(session.store().count(), 1);
}

#[test]
fn full_store_keeps_the_form() {
    let mut session = Session::new(
        &example_questionnaires::commute(),
        MemoryStore::new().with_capacity_limit(0),
        config(),
    );
    start(&mut session, "0001");
    press(&mut session, Event::Digit(3));

    let changes = press(&mut session, Event::Save);
    assert!(matches!(
        changes.as_slice(),
        [StateChange::Rejected(EntryError::Storage(message))] if message.contains("full")
    ));
    assert_eq!(session.answers().get_choice(&id("Q1")).unwrap(), 3);
    assert_eq!(session.record_id(), "0001");
}

#[test]
fn override_answers_are_flagged_and_restored() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(5));
    assert_eq!(session.position(), at(4));

    let changes = press(&mut session, Event::ToggleManual(id("Q2")));
    assert_eq!(
        changes,
        vec![
            StateChange::OverrideChanged {
                target: id("Q2"),
                open: true,
            },
            StateChange::Shown(id("Q2")),
        ]
    );
    press(&mut session, Event::Focus { index: 1, row: 0 });
    Script::new().digits("30").run(&mut session);
    assert_eq!(session.forced_override_ids(), vec![id("Q2")]);

    let changes = press(&mut session, Event::Save);
    assert!(matches!(
        &changes[0],
        StateChange::Saved { forced, .. } if *forced == vec![id("Q2")]
    ));
    assert_eq!(session.store().get(0).unwrap().forced, vec![id("Q2")]);

    press(&mut session, Event::LoadRecord(0));
    assert!(session.visibility().is_overridden(&id("Q2")));
    assert!(session.is_visible(1));
    assert_eq!(session.answers().get_number(&id("Q2")).unwrap(), 30);
}

#[test]
fn closing_override_hides_clears_and_moves_focus() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Digit(5));
    press(&mut session, Event::ToggleManual(id("Q2")));
    press(&mut session, Event::Focus { index: 1, row: 0 });
    press(&mut session, Event::Digit(3));

    let changes = press(&mut session, Event::ToggleManual(id("Q2")));
    assert_eq!(
        changes,
        vec![
            StateChange::OverrideChanged {
                target: id("Q2"),
                open: false,
            },
            StateChange::Hidden {
                target: id("Q2"),
                cleared: vec![id("Q2")],
            },
            StateChange::CursorMoved(at(4)),
        ]
    );
    assert!(session.forced_override_ids().is_empty());
}

#[test]
fn branches_open_together() {
    let mut session = commute_session();
    start(&mut session, "0001");
    let changes = press(&mut session, Event::OpenBranches(id("Q1")));
    assert!(changes.contains(&StateChange::Shown(id("Q2"))));
    assert!(changes.contains(&StateChange::Shown(id("Q3"))));
    assert!(!session.is_visible(3));

    press(&mut session, Event::Digit(1));
    press(&mut session, Event::CloseBranches(id("Q1")));
    assert!(session.is_visible(1));
    assert!(!session.is_visible(2));
}

#[test]
fn show_all_answers_are_flagged() {
    let mut session = commute_session();
    start(&mut session, "0001");
    let changes = press(&mut session, Event::SetShowAll(true));
    assert_eq!(changes[0], StateChange::ShowAllChanged(true));
    assert!(changes.contains(&StateChange::Shown(id("work"))));

    press(&mut session, Event::Focus { index: 5, row: 0 });
    Script::new().text("IT").run(&mut session);
    let changes = press(&mut session, Event::Save);
    assert!(matches!(
        &changes[0],
        StateChange::Saved { forced, .. } if *forced == vec![id("Q5")]
    ));
    assert!(session.visibility().show_all());
}

#[test]
fn multi_select_round_trip() {
    let questionnaire = Questionnaire::from_json(
        r#"{"surveyName": "rt", "sections": [{"questions": [
            {"id": "M", "type": "checkbox", "options": [
                {"value": 1}, {"value": 2}, {"value": 3},
                {"value": 4}, {"value": 5}, {"value": 6}
            ]}
        ]}]}"#,
    )
    .unwrap();
    let mut session = Session::new(&questionnaire, MemoryStore::new(), config());
    start(&mut session, "9");
    Script::new().digits("2").digits("5").save().run(&mut session);
    assert_eq!(session.store().get(0).unwrap().value(&id("M")), "2,5");

    let changes = press(&mut session, Event::LoadRecord(0));
    assert!(changes.contains(&StateChange::Loaded {
        index: 0,
        id: "9".to_string(),
    }));
    assert_eq!(session.answers().selected(&id("M")), &[2, 5]);
    assert_eq!(session.editing(), Some(0));

    // Re-saving a loaded record updates it in place.
    let changes = press(&mut session, Event::Save);
    assert!(matches!(
        &changes[0],
        StateChange::Saved { index: 0, updated: true, .. }
    ));
    assert_eq!(session.store().count(), 1);
}

#[test]
fn delete_shifts_the_edited_record() {
    let mut session = commute_session();
    for record_id in ["a", "b"] {
        start(&mut session, record_id);
        Script::new().digits("4").save().run(&mut session);
    }
    press(&mut session, Event::LoadRecord(1));
    let changes = press(&mut session, Event::DeleteRecord(0));
    assert_eq!(
        changes,
        vec![StateChange::Deleted {
            index: 0,
            id: "a".to_string(),
        }]
    );
    assert_eq!(session.editing(), Some(0));
    assert_eq!(
        press(&mut session, Event::DeleteRecord(5)),
        vec![StateChange::Rejected(EntryError::NoSuchRecord(5))]
    );
}

#[test]
fn digit_buffer_follows_the_clock() {
    let mut session = Session::new(
        &example_questionnaires::library_visit(),
        MemoryStore::new(),
        config(),
    );
    start(&mut session, "1");
    press(&mut session, Event::Digit(4));
    Script::new().next().next().run(&mut session);
    assert_eq!(session.position(), at(3));

    let t0 = Instant::now();
    let changes = session.handle_at(Event::Digit(1), t0);
    assert_eq!(changes, vec![StateChange::DigitPending(1)]);
    assert!(session.next_deadline().is_some());
    assert!(
        session
            .handle_at(Event::Tick, t0 + Duration::from_millis(400))
            .is_empty()
    );

    let changes = session.handle_at(Event::Tick, t0 + Duration::from_millis(500));
    assert_eq!(
        changes,
        vec![
            StateChange::AnswerChanged {
                field: id("V4"),
                value: Some(AnswerValue::Choice(1)),
            },
            StateChange::ReachedEnd,
        ]
    );
    assert_eq!(session.pending_digit(), None);
}

#[test]
fn second_digit_forms_two_digit_value() {
    let mut session = Session::new(
        &example_questionnaires::library_visit(),
        MemoryStore::new(),
        config(),
    );
    start(&mut session, "1");
    press(&mut session, Event::Digit(4));
    press(&mut session, Event::Focus { index: 3, row: 0 });

    let t0 = Instant::now();
    session.handle_at(Event::Digit(1), t0);
    session.handle_at(Event::Digit(0), t0 + Duration::from_millis(100));
    assert_eq!(session.answers().get_choice(&id("V4")).unwrap(), 10);
}

#[test]
fn fourteen_option_dropdown() {
    let mut session = commute_session();
    start(&mut session, "0001");
    press(&mut session, Event::Focus { index: 7, row: 0 });

    let t0 = Instant::now();
    assert_eq!(
        session.handle_at(Event::Digit(1), t0),
        vec![StateChange::DigitPending(1)]
    );
    session.handle_at(Event::Digit(2), t0 + Duration::from_millis(200));
    assert_eq!(session.answers().get_choice(&id("Q7")).unwrap(), 12);
    assert_eq!(session.position(), at(8));

    // A lone leading digit commits when its window runs out.
    press(&mut session, Event::Focus { index: 7, row: 0 });
    let t1 = Instant::now();
    session.handle_at(Event::Digit(1), t1);
    session.handle_at(Event::Tick, t1 + Duration::from_millis(500));
    assert_eq!(session.answers().get_choice(&id("Q7")).unwrap(), 1);
    assert_eq!(session.position(), at(8));

    // No option starts with 0, so it commits at once and is refused.
    press(&mut session, Event::Focus { index: 7, row: 0 });
    assert_eq!(
        press(&mut session, Event::Digit(0)),
        vec![StateChange::Rejected(EntryError::InvalidOption {
            field: id("Q7"),
            value: 0,
        })]
    );
}

#[test]
fn navigation_flushes_pending_digit() {
    let mut session = Session::new(
        &example_questionnaires::library_visit(),
        MemoryStore::new(),
        config(),
    );
    start(&mut session, "1");
    press(&mut session, Event::Digit(4));
    press(&mut session, Event::Focus { index: 3, row: 0 });

    let t0 = Instant::now();
    session.handle_at(Event::Digit(1), t0);
    let changes = session.handle_at(Event::Next, t0 + Duration::from_millis(100));
    assert_eq!(changes.last(), Some(&StateChange::ReachedEnd));
    assert_eq!(session.answers().get_choice(&id("V4")).unwrap(), 1);
}

#[test]
fn file_store_keeps_saved_records() {
    let dir = tempfile::tempdir().unwrap();
    let questionnaire = example_questionnaires::commute();
    {
        let store = JsonFileStore::open(dir.path(), &questionnaire.storage_key).unwrap();
        let mut session = Session::new(&questionnaire, store, config());
        start(&mut session, "0042");
        Script::new().digits("2").digits("1").save().run(&mut session);
    }
    let store = JsonFileStore::open(dir.path(), &questionnaire.storage_key).unwrap();
    assert_eq!(store.count(), 1);
    let record = store.get(0).unwrap();
    assert_eq!(record.id, "0042");
    assert_eq!(record.value(&id("Q3")), "1");
}
