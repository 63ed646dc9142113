use chrono::{DateTime, FixedOffset, Local};
use clap::Subcommand;
use homeboard_core::{keys, Config, ReminderEngine, Section};

use super::{open_session, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Run one reminder pass now and print the reminder shown, or null
    Check {
        /// Section the user is looking at
        #[arg(long, default_value = "dashboard")]
        section: String,
        /// Evaluate at this RFC 3339 instant instead of the local clock
        #[arg(long)]
        at: Option<String>,
    },
    /// Print today's reminder ledger
    Ledger {
        /// Evaluate at this RFC 3339 instant instead of the local clock
        #[arg(long)]
        at: Option<String>,
    },
}

fn resolve_now(at: Option<&str>) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    match at {
        Some(text) => DateTime::parse_from_rfc3339(text),
        None => Ok(Local::now().into()),
    }
}

pub fn run(action: ReminderAction) -> CmdResult {
    let config = Config::load()?;
    let registry = open_session(&config)?;

    match action {
        ReminderAction::Check { section, at } => {
            let now = resolve_now(at.as_deref())?;
            let engine = ReminderEngine::from_config(&config.reminders);
            let shown = engine.run_pass(&registry, &now, &Section::from(section), false);
            print_json(&shown)
        }
        ReminderAction::Ledger { at } => {
            let now = resolve_now(at.as_deref())?;
            let ledger = registry.get(&keys::REMINDERS).for_day(now.date_naive());
            print_json(&ledger)
        }
    }
}
