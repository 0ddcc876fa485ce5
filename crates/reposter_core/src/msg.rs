use std::time::Instant;

use crate::{Configuration, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator asked to start; carries what the view looked like at that moment.
    StartRequested {
        view_supported: bool,
        document_height: i64,
        now: Instant,
    },
    /// Operator asked to stop. Takes effect at the next tick.
    StopRequested,
    /// New settings from the control interface.
    ConfigurationReplaced(Configuration),
    /// A scheduled tick fired and the view was observed.
    PollTick {
        observation: TickObservation,
        now: Instant,
    },
    /// The action sequence for an item ran (successfully or not).
    ItemAttempted { id: Option<ItemId> },
}

/// What the scheduler saw when a tick fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickObservation {
    /// The transient error banner was present and its retry control clicked.
    ErrorRecovered,
    /// Rendered items in document order, plus the current document height.
    Snapshot {
        items: Vec<ItemSnapshot>,
        document_height: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub id: Option<ItemId>,
    pub text: String,
}

impl ItemSnapshot {
    pub fn new(id: Option<ItemId>, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
