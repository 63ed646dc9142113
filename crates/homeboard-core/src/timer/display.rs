//! Display-side countdown cache.
//!
//! A shell ticking once per second can decrement this locally for smooth
//! rendering. It is never a source of truth: every authoritative event
//! (store notification, wake, reload) calls [`TimerDisplay::sync`], which
//! recomputes from the persisted stamp.

use super::state::TimerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDisplay {
    state: TimerState,
    seconds: u32,
}

impl TimerDisplay {
    pub fn new(state: TimerState, now_epoch_ms: i64) -> Self {
        Self {
            state,
            seconds: state.reconcile(now_epoch_ms),
        }
    }

    /// Recompute from `state`, discarding any locally ticked value.
    pub fn sync(&mut self, state: TimerState, now_epoch_ms: i64) -> u32 {
        self.state = state;
        self.seconds = state.reconcile(now_epoch_ms);
        self.seconds
    }

    /// Local one-second step. Only moves while the timer is running.
    pub fn tick(&mut self) -> u32 {
        if self.state.is_running() {
            self.seconds = self.seconds.saturating_sub(1);
        }
        self.seconds
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// `MM:SS` rendering of the cached value.
    pub fn formatted(&self) -> String {
        format!("{:02}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}
