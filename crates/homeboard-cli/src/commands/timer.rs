use clap::Subcommand;
use homeboard_core::timer::now_epoch_ms;
use homeboard_core::{keys, Config, TimerState};
use serde::Serialize;

use super::{open_session, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a fresh focus countdown
    Start {
        /// Countdown length in seconds (defaults to timer.focus_duration_secs)
        #[arg(long)]
        seconds: Option<u32>,
    },
    /// Pause a running countdown, or resume a paused one
    Pause,
    /// Stop and reset to the full focus duration
    Stop,
    /// Print the reconciled timer state as JSON
    Status,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TimerReport {
    state: TimerState,
    display_seconds: u32,
    finished: bool,
}

impl TimerReport {
    fn at(state: TimerState, now: i64) -> Self {
        Self {
            state,
            display_seconds: state.reconcile(now),
            finished: state.is_finished(now),
        }
    }
}

pub fn run(action: TimerAction) -> CmdResult {
    let config = Config::load()?;
    let registry = open_session(&config)?;
    let now = now_epoch_ms();
    let current = *registry.get(&keys::TIMER);

    let next = match action {
        TimerAction::Start { seconds } => {
            let duration = seconds.unwrap_or(config.timer.focus_duration_secs);
            Some(TimerState::start_with(duration, now))
        }
        TimerAction::Pause => Some(current.toggle_pause(current.reconcile(now), now)),
        TimerAction::Stop => Some(TimerState::stop(now)),
        TimerAction::Status => None,
    };

    let state = match next {
        Some(state) => {
            registry.save(&keys::TIMER, state);
            state
        }
        None => current,
    };
    print_json(&TimerReport::at(state, now))
}
