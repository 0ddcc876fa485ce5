//! Reposter core: pure automation state machine.
//!
//! Nothing here touches a view or a clock. The scheduler observes the view,
//! feeds [`Msg`]s to [`update`], and executes the returned [`Effect`]s.
mod config;
mod effect;
mod ledger;
mod msg;
mod stall;
mod state;
mod update;
mod view_model;

pub use config::{Configuration, DEFAULT_DELAY_SECONDS, MAX_DELAY_SECONDS};
pub use effect::{Effect, ReloadReason, StartRejection};
pub use ledger::{DedupLedger, ItemId};
pub use msg::{ItemSnapshot, Msg, TickObservation};
pub use stall::{ScrollState, StallDetector, StallVerdict, STALL_THRESHOLD};
pub use state::{AutomationState, RunState};
pub use update::{
    next_eligible, update, ERROR_RETRY_DELAY, NO_PROGRESS_TIMEOUT, PAGINATION_SETTLE,
};
pub use view_model::StatusView;
