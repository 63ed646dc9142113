//! Per-day record of reminders already shown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rules::ReminderKind;

/// Default number of reminders shown per calendar day.
pub const DAILY_CAP: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLedger {
    #[serde(default)]
    pub shown_kinds: Vec<ReminderKind>,
    /// Day the entries belong to. `None` for a ledger never written.
    #[serde(default)]
    pub reset_boundary: Option<NaiveDate>,
}

impl ReminderLedger {
    /// This ledger as seen on `today`: unchanged if it belongs to today,
    /// otherwise empty and stamped with `today`.
    pub fn for_day(&self, today: NaiveDate) -> Self {
        if self.reset_boundary == Some(today) {
            return self.clone();
        }
        Self {
            shown_kinds: Vec::new(),
            reset_boundary: Some(today),
        }
    }

    pub fn contains(&self, kind: ReminderKind) -> bool {
        self.shown_kinds.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.shown_kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown_kinds.is_empty()
    }

    pub fn is_full(&self, cap: usize) -> bool {
        self.len() >= cap
    }

    /// New ledger for `today` with `kind` appended.
    pub fn with_shown(&self, kind: ReminderKind, today: NaiveDate) -> Self {
        let mut next = self.for_day(today);
        next.shown_kinds.push(kind);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn same_day_keeps_entries() {
        let ledger = ReminderLedger::default().with_shown(ReminderKind::Task, day(19));
        assert_eq!(ledger.for_day(day(19)).shown_kinds, vec![ReminderKind::Task]);
    }

    #[test]
    fn new_day_resets_lazily() {
        let ledger = ReminderLedger::default()
            .with_shown(ReminderKind::Task, day(19))
            .with_shown(ReminderKind::Fitness, day(19));
        assert!(ledger.is_full(DAILY_CAP));

        let next = ledger.for_day(day(20));
        assert!(next.is_empty());
        assert_eq!(next.reset_boundary, Some(day(20)));
        // The stored ledger itself is untouched until the next append.
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn persisted_layout() {
        let ledger = ReminderLedger::default().with_shown(ReminderKind::Routine, day(19));
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["shownKinds"], serde_json::json!(["routine"]));
        assert_eq!(json["resetBoundary"], "2026-10-19");
    }
}
