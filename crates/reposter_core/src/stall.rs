/// Unchanged height readings needed before the view counts as stuck.
pub const STALL_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    pub last_observed_height: i64,
    pub consecutive_unchanged: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallVerdict {
    /// Height changed since the previous reading.
    Growing,
    /// Height unchanged, but below the threshold.
    Unchanged { count: u32 },
    Stuck,
}

/// Classifies lazy loading as stuck once the document height stops changing
/// for [`STALL_THRESHOLD`] consecutive readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StallDetector {
    state: ScrollState,
    threshold: u32,
}

impl StallDetector {
    pub fn new(initial_height: i64) -> Self {
        Self::with_threshold(initial_height, STALL_THRESHOLD)
    }

    pub fn with_threshold(initial_height: i64, threshold: u32) -> Self {
        Self {
            state: ScrollState {
                last_observed_height: initial_height,
                consecutive_unchanged: 0,
            },
            threshold: threshold.max(1),
        }
    }

    pub fn observe(&mut self, height: i64) -> StallVerdict {
        if height == self.state.last_observed_height {
            self.state.consecutive_unchanged += 1;
            if self.state.consecutive_unchanged >= self.threshold {
                StallVerdict::Stuck
            } else {
                StallVerdict::Unchanged {
                    count: self.state.consecutive_unchanged,
                }
            }
        } else {
            self.state = ScrollState {
                last_observed_height: height,
                consecutive_unchanged: 0,
            };
            StallVerdict::Growing
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }
}

impl Default for StallDetector {
    fn default() -> Self {
        Self::new(0)
    }
}
