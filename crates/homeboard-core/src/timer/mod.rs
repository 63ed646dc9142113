mod display;
mod state;

pub use display::TimerDisplay;
pub use state::{now_epoch_ms, TimerState, FOCUS_DURATION_SECS};
