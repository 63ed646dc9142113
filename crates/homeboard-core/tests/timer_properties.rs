//! Property tests for timer reconciliation.

use homeboard_core::TimerState;
use proptest::prelude::*;

const T0: i64 = 1_760_000_000_000;

proptest! {
    #[test]
    fn running_display_is_remaining_minus_elapsed(
        time_left in 0u32..=7_200,
        elapsed in 0i64..=20_000,
        sub_second in 0i64..1_000,
    ) {
        let state = TimerState {
            is_active: true,
            is_paused: false,
            time_left_seconds: time_left,
            last_updated_at_epoch_ms: T0,
        };
        let now = T0 + elapsed * 1_000 + sub_second;
        let expected = (i64::from(time_left) - elapsed).max(0) as u32;
        prop_assert_eq!(state.reconcile(now), expected);
    }

    #[test]
    fn pause_then_resume_at_same_instant_is_neutral(
        offset_ms in 0i64..=3_000_000,
    ) {
        let now = T0 + offset_ms;
        let running = TimerState::start(T0);
        let shown = running.reconcile(now);

        let paused = running.toggle_pause(shown, now);
        prop_assert_eq!(paused.reconcile(now), shown);

        let resumed = paused.toggle_pause(paused.reconcile(now), now);
        prop_assert_eq!(resumed.reconcile(now), shown);
    }

    #[test]
    fn frozen_states_never_drift(
        is_active in any::<bool>(),
        time_left in 0u32..=10_000,
        later in 0i64..=86_400_000,
    ) {
        // Inactive, or active and paused.
        let state = TimerState {
            is_active,
            is_paused: is_active,
            time_left_seconds: time_left,
            last_updated_at_epoch_ms: T0,
        };
        prop_assert_eq!(state.reconcile(T0 + later), time_left);
    }

    #[test]
    fn persisted_state_roundtrips(
        is_active in any::<bool>(),
        is_paused in any::<bool>(),
        time_left in any::<u32>(),
        stamp in any::<i64>(),
    ) {
        let state = TimerState {
            is_active,
            is_paused,
            time_left_seconds: time_left,
            last_updated_at_epoch_ms: stamp,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: TimerState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, state);
    }
}
