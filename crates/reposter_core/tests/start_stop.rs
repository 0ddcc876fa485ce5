use std::sync::Once;
use std::time::{Duration, Instant};

use reposter_core::{
    update, AutomationState, Configuration, Effect, ItemId, ItemSnapshot, Msg, RunState,
    StartRejection, StatusView, TickObservation,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn start(state: AutomationState, view_supported: bool, now: Instant) -> (AutomationState, Vec<Effect>) {
    update(
        state,
        Msg::StartRequested {
            view_supported,
            document_height: 1000,
            now,
        },
    )
}

#[test]
fn start_without_match_terms_stays_stopped() {
    init_logging();
    let state = AutomationState::new(Configuration::new(["   ", ""], 5, true));

    let (next, effects) = start(state, true, Instant::now());

    assert_eq!(next.run_state(), RunState::Stopped);
    assert_eq!(
        effects,
        vec![Effect::StartRejected {
            reason: StartRejection::NoMatchTerms
        }]
    );
}

#[test]
fn start_on_unsupported_view_is_rejected_first() {
    init_logging();
    let state = AutomationState::new(Configuration::default());

    let (next, effects) = start(state, false, Instant::now());

    assert_eq!(next.run_state(), RunState::Stopped);
    assert_eq!(
        effects,
        vec![Effect::StartRejected {
            reason: StartRejection::UnsupportedView
        }]
    );
}

#[test]
fn start_schedules_an_immediate_tick() {
    init_logging();
    let state = AutomationState::new(Configuration::new(["#rust"], 5, true));

    let (mut next, effects) = start(state, true, Instant::now());

    assert_eq!(next.run_state(), RunState::Running);
    assert!(next.consume_dirty());
    assert_eq!(
        effects,
        vec![Effect::ScheduleTick {
            after: Duration::ZERO
        }]
    );
}

#[test]
fn start_while_running_is_a_noop() {
    init_logging();
    let now = Instant::now();
    let state = AutomationState::new(Configuration::new(["#rust"], 5, true));
    let (state, _) = start(state, true, now);

    let (next, effects) = start(state.clone(), true, now + Duration::from_secs(1));

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn stop_halts_the_next_tick() {
    init_logging();
    let now = Instant::now();
    let state = AutomationState::new(Configuration::new(["#rust"], 5, true));
    let (state, _) = start(state, true, now);
    let (state, effects) = update(state, Msg::StopRequested);
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Stopped);

    let (state, effects) = update(
        state,
        Msg::PollTick {
            observation: TickObservation::Snapshot {
                items: vec![ItemSnapshot::new(Some(ItemId::new("1")), "rust news")],
                document_height: 1000,
            },
            now,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.cursor(), 0);
}

#[test]
fn configuration_replacement_applies_to_the_next_tick() {
    init_logging();
    let now = Instant::now();
    let state = AutomationState::new(Configuration::new(["#rust"], 5, true));
    let (state, _) = start(state, true, now);
    let (state, _) = update(
        state,
        Msg::ConfigurationReplaced(Configuration::new(["golang"], 9, false)),
    );

    let (_state, effects) = update(
        state,
        Msg::PollTick {
            observation: TickObservation::Snapshot {
                items: vec![ItemSnapshot::new(Some(ItemId::new("1")), "all about GoLang today")],
                document_height: 1000,
            },
            now,
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::ProcessItem {
                index: 0,
                id: Some(ItemId::new("1")),
                annotation: "golang".to_string(),
                favorite: false,
            },
            Effect::ScheduleTick {
                after: Duration::from_secs(9)
            },
        ]
    );
}

#[test]
fn status_view_follows_the_run() {
    init_logging();
    let now = Instant::now();
    let state = AutomationState::new(Configuration::new(["rust"], 5, true));
    let (mut state, _) = start(state, true, now);
    assert!(state.consume_dirty());

    let (state, _) = update(
        state,
        Msg::PollTick {
            observation: TickObservation::Snapshot {
                items: vec![ItemSnapshot::new(Some(ItemId::new("1")), "learning rust")],
                document_height: 1000,
            },
            now,
        },
    );
    let (mut state, _) = update(
        state,
        Msg::ItemAttempted {
            id: Some(ItemId::new("1")),
        },
    );

    assert_eq!(
        state.view(),
        StatusView {
            run_state: RunState::Running,
            processed: 1,
            cursor: 1,
            unchanged_heights: 0,
        }
    );
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}
