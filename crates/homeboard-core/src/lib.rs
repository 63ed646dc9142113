//! # Homeboard Core Library
//!
//! State synchronization and notification core for the Homeboard personal
//! dashboard. UI shells (the desktop/web dashboard, the bundled CLI) read and
//! write state through this library and never own it themselves.
//!
//! ## Architecture
//!
//! - **Store Engine**: single-threaded registry of observable, whole-value
//!   stores with best-effort persistence
//! - **Timer**: wall-clock countdown that is reconciled from a persisted stamp
//!   instead of trusting a running counter
//! - **Reminders**: time-windowed rules over domain snapshots, limited per day
//!   and filtered by the section the user is looking at
//! - **Insights**: client for the external AI insight endpoint
//!
//! ## Key Components
//!
//! - [`StoreRegistry`]: owner of every store in a session
//! - [`TimerState`]: persisted countdown and its reconciliation
//! - [`ReminderEngine`] / [`ReminderScheduler`]: reminder selection and timing
//! - [`InsightsClient`]: insight fetching with typed "unavailable" results
//! - [`Config`]: application configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod insights;
pub mod keys;
pub mod reminder;
pub mod store;
pub mod timer;

pub use config::Config;
pub use domain::{DomainSnapshots, Section};
pub use error::{ConfigError, CoreError, InsightError, PersistError, Result};
pub use insights::{Insight, InsightCategory, InsightOutcome, InsightsClient, Unavailable};
pub use reminder::{
    ReminderCandidate, ReminderEngine, ReminderKind, ReminderLedger, ReminderScheduler,
};
pub use store::{MemoryBackend, SqliteBackend, StoreBackend, StoreKey, StoreRegistry};
pub use timer::{TimerDisplay, TimerState};
