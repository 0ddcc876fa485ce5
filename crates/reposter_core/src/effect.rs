use std::time::Duration;

use crate::ItemId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the next tick after `after`.
    ScheduleTick { after: Duration },
    /// Run the action sequence on the item at `index` of the tick's snapshot.
    ProcessItem {
        index: usize,
        id: Option<ItemId>,
        annotation: String,
        favorite: bool,
    },
    /// The item at `index` was eligible but matched no term.
    ItemSkipped { index: usize, id: Option<ItemId> },
    /// Scroll to trigger lazy loading.
    Paginate,
    /// Reload the view. Ends the current run.
    Reload { reason: ReloadReason },
    StartRejected { reason: StartRejection },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// No items rendered for longer than the progress timeout.
    NoProgress,
    /// Document height stopped growing across pagination attempts.
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    UnsupportedView,
    NoMatchTerms,
}
