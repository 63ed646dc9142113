//! Rule-based reminders.
//!
//! At most one reminder is surfaced per pass, at most one of each kind per
//! day, and at most [`DAILY_CAP`] in total per day.

mod engine;
mod ledger;
mod rules;
mod scheduler;

pub use engine::ReminderEngine;
pub use ledger::{ReminderLedger, DAILY_CAP};
pub use rules::{
    default_rules, ReminderCandidate, ReminderKind, ReminderRule, RuleCheck, TimeWindow,
};
pub use scheduler::{ActiveReminder, ReminderScheduler, DEBOUNCE_SECS, DISPLAY_SECS};
