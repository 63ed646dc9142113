//! Well-known store names.

use crate::domain::{FitnessSnapshot, PlanningSnapshot, RoutineSnapshot, WorkSnapshot};
use crate::reminder::ReminderLedger;
use crate::store::StoreKey;
use crate::timer::TimerState;

pub const TIMER: StoreKey<TimerState> = StoreKey::new("timer");
pub const REMINDERS: StoreKey<ReminderLedger> = StoreKey::new("reminders");

pub const WORK: StoreKey<WorkSnapshot> = StoreKey::new("work");
pub const FITNESS: StoreKey<FitnessSnapshot> = StoreKey::new("fitness");
pub const ROUTINE: StoreKey<RoutineSnapshot> = StoreKey::new("routine");
pub const PLANNING: StoreKey<PlanningSnapshot> = StoreKey::new("planning");

/// Names of every store the core knows about.
pub const ALL: [&str; 6] = [
    TIMER.name(),
    REMINDERS.name(),
    WORK.name(),
    FITNESS.name(),
    ROUTINE.name(),
    PLANNING.name(),
];
