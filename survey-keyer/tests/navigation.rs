//! Forward navigation visits exactly the displayed questions, in order,
//! whatever the answers, overrides and show-all mode are.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use survey_keyer::{
    Event, FieldId, MemoryStore, Position, Script, Session, SessionConfig, StateChange,
    compute_visibility,
};

const Q1_VALUES: &[u32] = &[1, 2, 3, 4, 5, 9];
const TARGETS: &[&str] = &["Q2", "Q3", "Q3a", "work"];

#[derive(Debug, Clone)]
struct FormState {
    q1: Option<u32>,
    q3: Vec<u32>,
    q4: Option<u32>,
    overrides: Vec<&'static str>,
    show_all: bool,
}

fn form_state() -> impl Strategy<Value = FormState> {
    (
        proptest::option::of(proptest::sample::select(Q1_VALUES)),
        proptest::sample::subsequence(vec![1u32, 2, 3], 0..=3),
        proptest::option::of(1u32..=2),
        proptest::sample::subsequence(TARGETS.to_vec(), 0..=TARGETS.len()),
        any::<bool>(),
    )
        .prop_map(|(q1, q3, q4, overrides, show_all)| FormState {
            q1,
            q3,
            q4,
            overrides,
            show_all,
        })
}

fn select(session: &mut Session<MemoryStore>, index: usize, value: u32) {
    session.handle(Event::Focus { index, row: 0 });
    session.handle(Event::Select(value));
}

fn prepare(state: &FormState) -> Session<MemoryStore> {
    let mut session = Session::new(
        &example_questionnaires::commute(),
        MemoryStore::new(),
        SessionConfig::default(),
    );
    Script::new().id("P").run(&mut session);
    if let Some(q1) = state.q1 {
        select(&mut session, 0, q1);
    }
    if session.is_visible(2) {
        for value in &state.q3 {
            select(&mut session, 2, *value);
        }
    }
    if let Some(q4) = state.q4 {
        select(&mut session, 4, q4);
    }
    for target in &state.overrides {
        session.handle(Event::ToggleManual(FieldId::new(*target)));
    }
    session.handle(Event::SetShowAll(state.show_all));
    session.handle(Event::FocusId);
    session
}

proptest! {
    #[test]
    fn next_walks_every_visible_question_once(state in form_state()) {
        let mut session = prepare(&state);
        let expected: BTreeSet<usize> = (0..session.list().len())
            .filter(|i| session.is_visible(*i))
            .collect();

        let mut visited = Vec::new();
        let mut last: Option<(usize, usize)> = None;
        for _ in 0..200 {
            let changes = session.handle(Event::Next);
            if changes.contains(&StateChange::ReachedEnd) {
                break;
            }
            for change in changes {
                if let StateChange::CursorMoved(Position::AtQuestion { index, row }) = change {
                    prop_assert!(session.is_visible(index), "landed on hidden {index}");
                    if let Some(previous) = last {
                        prop_assert!((index, row) > previous);
                    }
                    last = Some((index, row));
                    if row == 0 {
                        visited.push(index);
                    }
                }
            }
        }

        let visited_set: BTreeSet<usize> = visited.iter().copied().collect();
        prop_assert_eq!(visited.len(), visited_set.len());
        prop_assert_eq!(visited_set, expected);
    }

    #[test]
    fn displayed_state_agrees_with_pure_evaluation(state in form_state()) {
        let session = prepare(&state);
        let overrides: HashSet<FieldId> = TARGETS
            .iter()
            .map(|t| FieldId::new(*t))
            .filter(|t| session.visibility().is_overridden(t))
            .collect();
        let computed = compute_visibility(
            session.table(),
            session.answers(),
            &overrides,
            session.visibility().show_all(),
        );
        for target in TARGETS {
            let target = FieldId::new(*target);
            let displayed = session.visibility().is_shown(&target);
            prop_assert_eq!(computed.get(&target).copied().unwrap_or(true), displayed, "{}", target);
        }
    }
}
