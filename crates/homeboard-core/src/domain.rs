//! Domain snapshots read by the reminder rules.
//!
//! These stores are owned by the dashboard's sections; the core only reads
//! them. Every field a rule looks at is optional or defaulted so a partial
//! record still decodes, and rules treat absent data as "condition not met".

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::keys;
use crate::store::StoreRegistry;

/// A dashboard section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Section {
    Dashboard,
    Work,
    Fitness,
    Routine,
    Planning,
    /// A section with no reminder rules of its own.
    Other(String),
}

impl Section {
    pub fn as_str(&self) -> &str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Work => "work",
            Section::Fitness => "fitness",
            Section::Routine => "routine",
            Section::Planning => "planning",
            Section::Other(name) => name,
        }
    }

    pub fn is_dashboard(&self) -> bool {
        matches!(self, Section::Dashboard)
    }
}

impl From<&str> for Section {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "home" | "" => Section::Dashboard,
            "work" => Section::Work,
            "fitness" => Section::Fitness,
            "routine" => Section::Routine,
            "planning" => Section::Planning,
            other => Section::Other(other.to_string()),
        }
    }
}

impl From<String> for Section {
    fn from(s: String) -> Self {
        Section::from(s.as_str())
    }
}

impl From<Section> for String {
    fn from(section: Section) -> Self {
        section.as_str().to_string()
    }
}

impl FromStr for Section {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Section::from(s))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Work ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkSnapshot {
    #[serde(default)]
    pub items: Vec<WorkItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl WorkItem {
    pub fn is_pending(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("pending"))
    }
}

impl WorkSnapshot {
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_pending()).count()
    }
}

// ── Fitness ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessSnapshot {
    #[serde(default)]
    pub activities: Vec<FitnessActivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessActivity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timestamp: Option<ActivityTimestamp>,
}

/// When an activity happened, as the fitness section recorded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityTimestamp {
    /// Epoch milliseconds.
    Millis(i64),
    /// RFC 3339, or a local `YYYY-MM-DD[(T| )HH:MM:SS[.fff]]`.
    Text(String),
    /// Anything else; never matches a date.
    Unrecognized(serde_json::Value),
}

/// Local timestamps without an offset, with or without fractional seconds.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

impl ActivityTimestamp {
    /// Calendar date in the offset of `reference`, if the timestamp is
    /// readable.
    pub fn local_date(&self, reference: &DateTime<FixedOffset>) -> Option<NaiveDate> {
        let offset = reference.offset();
        match self {
            ActivityTimestamp::Millis(ms) => offset
                .timestamp_millis_opt(*ms)
                .single()
                .map(|dt| dt.date_naive()),
            ActivityTimestamp::Text(text) => {
                let text = text.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                    return Some(dt.with_timezone(offset).date_naive());
                }
                NAIVE_DATE_TIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                    .map(|dt| dt.date())
                    .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
            }
            ActivityTimestamp::Unrecognized(_) => None,
        }
    }
}

impl FitnessSnapshot {
    /// Whether every activity has a readable timestamp and none falls on
    /// the date of `now`.
    ///
    /// An activity with a missing or unreadable timestamp makes the answer
    /// `false`: we cannot claim nothing was logged today.
    pub fn nothing_logged_on(&self, now: &DateTime<FixedOffset>) -> bool {
        let today = now.date_naive();
        self.activities.iter().all(|activity| {
            activity
                .timestamp
                .as_ref()
                .and_then(|ts| ts.local_date(now))
                .is_some_and(|date| date != today)
        })
    }
}

// ── Routine ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineSnapshot {
    #[serde(default)]
    pub routines: Vec<Routine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<RoutineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutineItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl RoutineSnapshot {
    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines
            .iter()
            .find(|r| r.name.trim().eq_ignore_ascii_case(name))
    }
}

impl Routine {
    /// Items explicitly marked not completed.
    pub fn incomplete_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.completed == Some(false))
            .count()
    }
}

// ── Planning ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningSnapshot {
    #[serde(default)]
    pub weekly_goals: Vec<Goal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default)]
    pub text: Option<String>,
}

impl PlanningSnapshot {
    /// No goal with any non-blank text.
    pub fn goals_blank(&self) -> bool {
        self.weekly_goals
            .iter()
            .all(|g| g.text.as_deref().map_or(true, |t| t.trim().is_empty()))
    }
}

/// All four domain snapshots, read at one point in time.
#[derive(Debug, Clone, Default)]
pub struct DomainSnapshots {
    pub work: Rc<WorkSnapshot>,
    pub fitness: Rc<FitnessSnapshot>,
    pub routine: Rc<RoutineSnapshot>,
    pub planning: Rc<PlanningSnapshot>,
}

impl DomainSnapshots {
    pub fn read(registry: &StoreRegistry) -> Self {
        Self {
            work: registry.get(&keys::WORK),
            fitness: registry.get(&keys::FITNESS),
            routine: registry.get(&keys::ROUTINE),
            planning: registry.get(&keys::PLANNING),
        }
    }
}
