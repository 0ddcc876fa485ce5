use std::fmt;

use reposter_core::{ItemId, ReloadReason, StartRejection};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("invalid selector {selector}: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error("node is no longer attached to the document")]
    Detached,
    #[error("no open page matches {0}")]
    PageNotFound(String),
    #[error("devtools endpoint discovery failed: {0}")]
    Endpoint(String),
    #[error("view driver error: {0}")]
    Driver(String),
}

impl ViewError {
    pub(crate) fn driver(err: impl fmt::Display) -> Self {
        Self::Driver(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The step is turned off in the configuration.
    Disabled,
    /// The item is already in the state the step would produce.
    AlreadyDone,
    /// An expected control is not rendered.
    MissingControl(&'static str),
    /// The submit control never became enabled.
    SubmitUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "disabled"),
            SkipReason::AlreadyDone => write!(f, "already done"),
            SkipReason::MissingControl(control) => write!(f, "{control} control missing"),
            SkipReason::SubmitUnavailable => write!(f, "submit control unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// The action was triggered but no confirmation control appeared.
    Unconfirmed,
    Skipped(SkipReason),
    Failed(String),
}

impl StepOutcome {
    pub(crate) fn from_result(result: Result<StepOutcome, ViewError>) -> Self {
        result.unwrap_or_else(|err| StepOutcome::Failed(err.to_string()))
    }
}

/// Per-step results of one action sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub favorite: StepOutcome,
    pub annotate: StepOutcome,
    pub reshare: StepOutcome,
}

/// The unit of work one poll tick performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The run is stopped; nothing was scheduled.
    Halted,
    ErrorRecovered,
    Processed {
        id: Option<ItemId>,
        report: ActionReport,
    },
    Skipped { id: Option<ItemId> },
    Paginated,
    /// No items rendered yet; waiting for the view.
    Waiting,
    Reloaded { reason: ReloadReason },
}

/// Why a start request did not change the run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    Rejected(StartRejection),
}
