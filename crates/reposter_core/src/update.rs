use std::time::{Duration, Instant};

use crate::{
    AutomationState, DedupLedger, Effect, ItemSnapshot, Msg, ReloadReason, StallVerdict,
    StartRejection, TickObservation,
};

/// Re-poll interval after the error banner's retry control was clicked.
pub const ERROR_RETRY_DELAY: Duration = Duration::from_secs(2);
/// With no rendered items for longer than this, the view is reloaded.
pub const NO_PROGRESS_TIMEOUT: Duration = Duration::from_secs(10);
/// Extra wait after pagination so lazy loading can deliver.
pub const PAGINATION_SETTLE: Duration = Duration::from_secs(2);

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AutomationState, msg: Msg) -> (AutomationState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested {
            view_supported,
            document_height,
            now,
        } => {
            if state.is_running() {
                return (state, Vec::new());
            }
            if !view_supported {
                vec![Effect::StartRejected {
                    reason: StartRejection::UnsupportedView,
                }]
            } else if !state.config().has_match_terms() {
                vec![Effect::StartRejected {
                    reason: StartRejection::NoMatchTerms,
                }]
            } else {
                state.begin_run(document_height, now);
                vec![Effect::ScheduleTick {
                    after: Duration::ZERO,
                }]
            }
        }
        Msg::StopRequested => {
            state.halt();
            Vec::new()
        }
        Msg::ConfigurationReplaced(config) => {
            state.set_config(config);
            Vec::new()
        }
        Msg::PollTick { observation, now } => poll_tick(&mut state, observation, now),
        Msg::ItemAttempted { id } => {
            // Unidentifiable items never enter the ledger, so they may come round again.
            if let Some(id) = id {
                state.record_attempt(id);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn poll_tick(state: &mut AutomationState, observation: TickObservation, now: Instant) -> Vec<Effect> {
    if !state.is_running() {
        return Vec::new();
    }

    let (items, document_height) = match observation {
        TickObservation::ErrorRecovered => {
            return vec![Effect::ScheduleTick {
                after: ERROR_RETRY_DELAY,
            }];
        }
        TickObservation::Snapshot {
            items,
            document_height,
        } => (items, document_height),
    };

    let delay = state.config().per_item_delay();

    if items.is_empty() {
        if state.progress_overdue(now, NO_PROGRESS_TIMEOUT) {
            return reload(state, ReloadReason::NoProgress);
        }
        return vec![Effect::ScheduleTick { after: delay }];
    }

    let Some(index) = next_eligible(&items, state.cursor(), state.ledger()) else {
        return match state.observe_height(document_height) {
            StallVerdict::Stuck => reload(state, ReloadReason::Stalled),
            StallVerdict::Growing | StallVerdict::Unchanged { .. } => {
                state.set_cursor(0);
                vec![
                    Effect::Paginate,
                    Effect::ScheduleTick {
                        after: delay.saturating_add(PAGINATION_SETTLE),
                    },
                ]
            }
        };
    };

    let item = &items[index];
    let config = state.config();
    let handled = if config.matches(&item.text) {
        Effect::ProcessItem {
            index,
            id: item.id.clone(),
            annotation: config.annotation(),
            favorite: config.favorite_enabled(),
        }
    } else {
        Effect::ItemSkipped {
            index,
            id: item.id.clone(),
        }
    };

    state.mark_progress(now);
    state.set_cursor(index + 1);
    vec![handled, Effect::ScheduleTick { after: delay }]
}

/// First item at or after `cursor` that is not in the ledger.
/// Items without an identifier always qualify.
pub fn next_eligible(items: &[ItemSnapshot], cursor: usize, ledger: &DedupLedger) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .skip(cursor)
        .find(|(_, item)| item.id.as_ref().map_or(true, |id| !ledger.contains(id)))
        .map(|(index, _)| index)
}

fn reload(state: &mut AutomationState, reason: ReloadReason) -> Vec<Effect> {
    state.halt();
    vec![Effect::Reload { reason }]
}
