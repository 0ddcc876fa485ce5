use std::time::{Duration, Instant};

use crate::view_model::StatusView;
use crate::{Configuration, DedupLedger, ItemId, StallDetector, StallVerdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Everything one automation run owns. A full reload discards it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutomationState {
    run_state: RunState,
    config: Configuration,
    ledger: DedupLedger,
    stall: StallDetector,
    cursor: usize,
    last_progress: Option<Instant>,
    dirty: bool,
}

impl AutomationState {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn view(&self) -> StatusView {
        StatusView {
            run_state: self.run_state,
            processed: self.ledger.len(),
            cursor: self.cursor,
            unchanged_heights: self.stall.state().consecutive_unchanged,
        }
    }

    /// Returns whether the status changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn stall(&self) -> &StallDetector {
        &self.stall
    }

    pub fn last_progress(&self) -> Option<Instant> {
        self.last_progress
    }

    /// Time since the last attempt exceeds `timeout`.
    pub fn progress_overdue(&self, now: Instant, timeout: Duration) -> bool {
        self.last_progress
            .map(|last| now.saturating_duration_since(last) > timeout)
            .unwrap_or(false)
    }

    pub(crate) fn begin_run(&mut self, document_height: i64, now: Instant) {
        self.run_state = RunState::Running;
        self.last_progress = Some(now);
        self.stall = StallDetector::new(document_height);
        self.dirty = true;
    }

    pub(crate) fn halt(&mut self) {
        if self.run_state != RunState::Stopped {
            self.run_state = RunState::Stopped;
            self.dirty = true;
        }
    }

    pub(crate) fn set_config(&mut self, config: Configuration) {
        self.config = config;
    }

    pub(crate) fn record_attempt(&mut self, id: ItemId) {
        if self.ledger.record(id) {
            self.dirty = true;
        }
    }

    pub(crate) fn observe_height(&mut self, height: i64) -> StallVerdict {
        self.stall.observe(height)
    }

    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub(crate) fn mark_progress(&mut self, now: Instant) {
        self.last_progress = Some(now);
    }
}
