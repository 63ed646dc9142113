//! Reminder evaluation engine.
//!
//! One pass reads the domain snapshots and today's ledger, derives the
//! candidates, and picks at most one for the active section. The only write
//! a pass performs is appending the chosen kind to the ledger store.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use super::ledger::{ReminderLedger, DAILY_CAP};
use super::rules::{default_rules, ReminderCandidate, ReminderRule};
use crate::config::ReminderConfig;
use crate::domain::{DomainSnapshots, Section};
use crate::keys;
use crate::store::StoreRegistry;

#[derive(Debug, Clone)]
pub struct ReminderEngine {
    rules: Vec<ReminderRule>,
    daily_cap: usize,
    enabled: bool,
}

impl ReminderEngine {
    /// Engine with the built-in rules and a cap of two per day.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            daily_cap: DAILY_CAP,
            enabled: true,
        }
    }

    /// Engine following `config`. The cap never rises above [`DAILY_CAP`].
    pub fn from_config(config: &ReminderConfig) -> Self {
        Self {
            rules: default_rules(),
            daily_cap: config.daily_cap.min(DAILY_CAP),
            enabled: config.enabled,
        }
    }

    pub fn with_rules(mut self, rules: Vec<ReminderRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[ReminderRule] {
        &self.rules
    }

    pub fn daily_cap(&self) -> usize {
        self.daily_cap
    }

    /// Every candidate for `now`, in rule order, skipping kinds already in
    /// `ledger`. `ledger` must already be the view for today.
    pub fn candidates(
        &self,
        snapshots: &DomainSnapshots,
        ledger: &ReminderLedger,
        now: &DateTime<FixedOffset>,
    ) -> Vec<ReminderCandidate> {
        self.rules
            .iter()
            .filter(|rule| !ledger.contains(rule.kind))
            .filter_map(|rule| rule.evaluate(snapshots, now))
            .collect()
    }

    /// Pick the reminder to show, without side effects.
    ///
    /// Returns `None` when the daily cap is reached, when a reminder is
    /// already on screen, or when no candidate belongs to `active_section`.
    /// On the dashboard the first candidate in rule order wins.
    pub fn select(
        &self,
        snapshots: &DomainSnapshots,
        ledger: &ReminderLedger,
        now: &DateTime<FixedOffset>,
        active_section: &Section,
        reminder_showing: bool,
    ) -> Option<ReminderCandidate> {
        if !self.enabled || ledger.is_full(self.daily_cap) || reminder_showing {
            return None;
        }

        let candidates = self.candidates(snapshots, ledger, now);
        debug!(
            section = %active_section,
            candidates = candidates.len(),
            shown_today = ledger.len(),
            "reminder candidates evaluated"
        );

        if active_section.is_dashboard() {
            return candidates.into_iter().next();
        }
        candidates
            .into_iter()
            .find(|c| c.related_section.as_ref() == Some(active_section))
    }

    /// Run one pass against the registry.
    ///
    /// On selection the kind is appended to the `reminders` ledger and the
    /// candidate is returned for display.
    pub fn run_pass(
        &self,
        registry: &StoreRegistry,
        now: &DateTime<FixedOffset>,
        active_section: &Section,
        reminder_showing: bool,
    ) -> Option<ReminderCandidate> {
        let today = now.date_naive();
        let ledger = registry.get(&keys::REMINDERS).for_day(today);
        let snapshots = DomainSnapshots::read(registry);

        let chosen = self.select(&snapshots, &ledger, now, active_section, reminder_showing)?;

        registry.save(&keys::REMINDERS, ledger.with_shown(chosen.kind, today));
        info!(
            kind = chosen.kind.as_str(),
            section = %active_section,
            "reminder shown"
        );
        Some(chosen)
    }
}

impl Default for ReminderEngine {
    fn default() -> Self {
        Self::new()
    }
}
