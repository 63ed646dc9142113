//! Persisted countdown state and its reconciliation.
//!
//! The timer does not run a thread and does not trust any in-memory counter.
//! The remaining time is always recomputed from the last persisted stamp and
//! the current wall clock, so a backgrounded or reloaded shell picks up the
//! true value.
//!
//! ## State Transitions
//!
//! ```text
//! Inactive --start--> Running --toggle_pause--> Paused --toggle_pause--> Running
//!     ^                  |                        |
//!     +------stop--------+-----------stop---------+
//! ```

use serde::{Deserialize, Serialize};

/// Full focus duration in seconds (25 minutes).
pub const FOCUS_DURATION_SECS: u32 = 25 * 60;

/// Countdown timer state as persisted in the `timer` store.
///
/// Every operation returns a new value; the persisted value is never edited
/// in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_paused: bool,
    /// Remaining seconds as of `last_updated_at_epoch_ms`.
    ///
    /// Authoritative when paused or inactive; a starting point for
    /// reconciliation while running.
    #[serde(default = "default_time_left")]
    pub time_left_seconds: u32,
    #[serde(default)]
    pub last_updated_at_epoch_ms: i64,
}

fn default_time_left() -> u32 {
    FOCUS_DURATION_SECS
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            is_active: false,
            is_paused: false,
            time_left_seconds: FOCUS_DURATION_SECS,
            last_updated_at_epoch_ms: 0,
        }
    }
}

impl TimerState {
    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.is_active && !self.is_paused
    }

    /// Remaining seconds as of `now_epoch_ms`.
    ///
    /// Only a running timer is corrected for elapsed wall-clock time. Partial
    /// seconds are not counted, and a clock that moved backwards counts as no
    /// elapsed time.
    pub fn reconcile(&self, now_epoch_ms: i64) -> u32 {
        if !self.is_running() {
            return self.time_left_seconds;
        }
        let elapsed_secs = now_epoch_ms
            .saturating_sub(self.last_updated_at_epoch_ms)
            .div_euclid(1000)
            .max(0);
        let elapsed_secs = u32::try_from(elapsed_secs).unwrap_or(u32::MAX);
        self.time_left_seconds.saturating_sub(elapsed_secs)
    }

    /// Active timer that has counted down to zero.
    ///
    /// The timer keeps its active flag at zero; shells decide what to do.
    pub fn is_finished(&self, now_epoch_ms: i64) -> bool {
        self.is_active && self.reconcile(now_epoch_ms) == 0
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(now_epoch_ms: i64) -> Self {
        Self::start_with(FOCUS_DURATION_SECS, now_epoch_ms)
    }

    /// Start a countdown of `duration_secs`.
    pub fn start_with(duration_secs: u32, now_epoch_ms: i64) -> Self {
        Self {
            is_active: true,
            is_paused: false,
            time_left_seconds: duration_secs,
            last_updated_at_epoch_ms: now_epoch_ms,
        }
    }

    /// Pause a running timer or resume a paused one.
    ///
    /// `current_display_secs` must be the value just produced by
    /// [`reconcile`](Self::reconcile), so the pause boundary neither loses
    /// nor double-counts time. An inactive timer is returned unchanged.
    pub fn toggle_pause(&self, current_display_secs: u32, now_epoch_ms: i64) -> Self {
        if !self.is_active {
            return *self;
        }
        Self {
            is_active: true,
            is_paused: !self.is_paused,
            time_left_seconds: current_display_secs,
            last_updated_at_epoch_ms: now_epoch_ms,
        }
    }

    /// Stop and reset to the full focus duration.
    pub fn stop(now_epoch_ms: i64) -> Self {
        Self {
            is_active: false,
            is_paused: false,
            time_left_seconds: FOCUS_DURATION_SECS,
            last_updated_at_epoch_ms: now_epoch_ms,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
