//! Debounced reminder checks and display expiry.
//!
//! Works on deadlines instead of owning a runtime timer: the shell arms one
//! timeout for [`ReminderScheduler::next_deadline`] and calls
//! [`ReminderScheduler::poll`] when it fires. A newer section change
//! replaces the pending check rather than stacking another one.

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;
use tracing::debug;

use super::engine::ReminderEngine;
use super::rules::ReminderCandidate;
use crate::config::ReminderConfig;
use crate::domain::Section;
use crate::store::StoreRegistry;

/// Delay between a section change and the reminder check.
pub const DEBOUNCE_SECS: i64 = 2;
/// How long a reminder stays on screen unless dismissed.
pub const DISPLAY_SECS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingCheck {
    section: Section,
    due_at: DateTime<FixedOffset>,
}

/// The reminder currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveReminder {
    pub candidate: ReminderCandidate,
    pub shown_at: DateTime<FixedOffset>,
    pub expires_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    debounce: Duration,
    display: Duration,
    pending: Option<PendingCheck>,
    active: Option<ActiveReminder>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self {
            debounce: Duration::seconds(DEBOUNCE_SECS),
            display: Duration::seconds(DISPLAY_SECS),
            pending: None,
            active: None,
        }
    }

    pub fn from_config(config: &ReminderConfig) -> Self {
        Self {
            debounce: Duration::seconds(i64::from(config.debounce_secs)),
            display: Duration::seconds(i64::from(config.display_secs)),
            ..Self::new()
        }
    }

    /// Schedule a check for `section`, replacing any pending one.
    pub fn section_changed(&mut self, section: Section, now: DateTime<FixedOffset>) {
        if let Some(previous) = &self.pending {
            debug!(from = %previous.section, to = %section, "pending reminder check replaced");
        }
        self.pending = Some(PendingCheck {
            section,
            due_at: now + self.debounce,
        });
    }

    /// Advance to `now`: expire the displayed reminder if its time is up,
    /// then run the pending check if it is due.
    ///
    /// Returns the reminder that became visible during this call.
    pub fn poll(
        &mut self,
        engine: &ReminderEngine,
        registry: &StoreRegistry,
        now: DateTime<FixedOffset>,
    ) -> Option<ReminderCandidate> {
        if self.active.as_ref().is_some_and(|a| now >= a.expires_at) {
            debug!("reminder display expired");
            self.active = None;
        }

        if !self.pending.as_ref().is_some_and(|p| now >= p.due_at) {
            return None;
        }
        let check = self.pending.take()?;
        let candidate = engine.run_pass(registry, &now, &check.section, self.active.is_some())?;

        self.active = Some(ActiveReminder {
            candidate: candidate.clone(),
            shown_at: now,
            expires_at: now + self.display,
        });
        Some(candidate)
    }

    /// Close the displayed reminder early. Cancels its expiry.
    pub fn dismiss(&mut self) -> Option<ReminderCandidate> {
        self.active.take().map(|a| a.candidate)
    }

    pub fn active(&self) -> Option<&ActiveReminder> {
        self.active.as_ref()
    }

    pub fn pending_section(&self) -> Option<&Section> {
        self.pending.as_ref().map(|p| &p.section)
    }

    /// Earliest moment `poll` has something to do.
    pub fn next_deadline(&self) -> Option<DateTime<FixedOffset>> {
        let check = self.pending.as_ref().map(|p| p.due_at);
        let expiry = self.active.as_ref().map(|a| a.expires_at);
        match (check, expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new()
    }
}
