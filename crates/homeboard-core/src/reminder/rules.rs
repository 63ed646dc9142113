//! Reminder rules: a time window plus a condition over domain snapshots.
//!
//! Rules are evaluated in declaration order; on the dashboard the first
//! surviving candidate wins, so the order below is also the priority.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainSnapshots, Section};

/// What a reminder is about. One of each per day at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Task,
    Fitness,
    Routine,
    Planning,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Task => "task",
            ReminderKind::Fitness => "fitness",
            ReminderKind::Routine => "routine",
            ReminderKind::Planning => "planning",
        }
    }
}

/// A reminder eligible for display, before section and rate-limit filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderCandidate {
    pub kind: ReminderKind,
    pub message: String,
    pub related_section: Option<Section>,
}

/// Local-time window a rule is allowed to fire in.
///
/// Hours are half-open: `[start_hour, end_hour)`. No end hour means "until
/// midnight"; no weekdays means every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: Option<u32>,
    pub weekdays: Option<&'static [Weekday]>,
}

impl TimeWindow {
    pub const fn hours(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour: Some(end_hour),
            weekdays: None,
        }
    }

    pub const fn from_hour(start_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour: None,
            weekdays: None,
        }
    }

    pub const fn on(self, weekdays: &'static [Weekday]) -> Self {
        Self {
            weekdays: Some(weekdays),
            ..self
        }
    }

    pub fn contains(&self, now: &DateTime<FixedOffset>) -> bool {
        if let Some(days) = self.weekdays {
            if !days.contains(&now.weekday()) {
                return false;
            }
        }
        let hour = now.hour();
        hour >= self.start_hour && self.end_hour.map_or(true, |end| hour < end)
    }
}

/// Returns the reminder text when the condition holds.
pub type RuleCheck = fn(&DomainSnapshots, &DateTime<FixedOffset>) -> Option<String>;

#[derive(Clone)]
pub struct ReminderRule {
    pub kind: ReminderKind,
    pub window: TimeWindow,
    pub section: Section,
    pub check: RuleCheck,
}

impl fmt::Debug for ReminderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderRule")
            .field("kind", &self.kind)
            .field("window", &self.window)
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

impl ReminderRule {
    /// Candidate for `now`, if inside the window and the condition holds.
    pub fn evaluate(
        &self,
        snapshots: &DomainSnapshots,
        now: &DateTime<FixedOffset>,
    ) -> Option<ReminderCandidate> {
        if !self.window.contains(now) {
            return None;
        }
        let message = (self.check)(snapshots, now)?;
        Some(ReminderCandidate {
            kind: self.kind,
            message,
            related_section: Some(self.section.clone()),
        })
    }
}

const MID_WEEK: &[Weekday] = &[Weekday::Wed, Weekday::Thu];

/// The built-in rules, in priority order.
pub fn default_rules() -> Vec<ReminderRule> {
    vec![
        ReminderRule {
            kind: ReminderKind::Task,
            window: TimeWindow::hours(15, 21),
            section: Section::Work,
            check: open_tasks,
        },
        ReminderRule {
            kind: ReminderKind::Fitness,
            window: TimeWindow::hours(18, 21),
            section: Section::Fitness,
            check: no_workout_today,
        },
        ReminderRule {
            kind: ReminderKind::Routine,
            window: TimeWindow::from_hour(20),
            section: Section::Routine,
            check: evening_routine_open,
        },
        ReminderRule {
            kind: ReminderKind::Planning,
            window: TimeWindow::hours(10, 20).on(MID_WEEK),
            section: Section::Planning,
            check: weekly_goals_blank,
        },
    ]
}

fn open_tasks(snapshots: &DomainSnapshots, _now: &DateTime<FixedOffset>) -> Option<String> {
    match snapshots.work.pending_count() {
        0 => None,
        1 => Some("One task is still open for today.".to_string()),
        n => Some(format!("{n} tasks are still open for today.")),
    }
}

fn no_workout_today(snapshots: &DomainSnapshots, now: &DateTime<FixedOffset>) -> Option<String> {
    snapshots
        .fitness
        .nothing_logged_on(now)
        .then(|| "No workout logged today yet. A short session still counts.".to_string())
}

fn evening_routine_open(
    snapshots: &DomainSnapshots,
    _now: &DateTime<FixedOffset>,
) -> Option<String> {
    let evening = snapshots.routine.routine("evening")?;
    (evening.incomplete_count() > 0)
        .then(|| "Your evening routine still has open items.".to_string())
}

fn weekly_goals_blank(snapshots: &DomainSnapshots, _now: &DateTime<FixedOffset>) -> Option<String> {
    snapshots
        .planning
        .goals_blank()
        .then(|| "Your weekly goals are still blank. Take a minute to set them.".to_string())
}
