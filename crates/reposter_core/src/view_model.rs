use crate::RunState;

/// Snapshot of the run for the start/stop indicator and status logging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusView {
    pub run_state: RunState,
    pub processed: usize,
    pub cursor: usize,
    pub unchanged_heights: u32,
}
