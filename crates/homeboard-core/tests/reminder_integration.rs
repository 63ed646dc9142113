//! Integration tests for reminder selection against a live registry.

use chrono::{DateTime, Duration, FixedOffset};
use homeboard_core::config::ReminderConfig;
use homeboard_core::domain::{
    ActivityTimestamp, FitnessActivity, FitnessSnapshot, Routine, RoutineItem, RoutineSnapshot,
    WorkItem, WorkSnapshot,
};
use homeboard_core::{keys, ReminderEngine, ReminderKind, ReminderScheduler, Section, StoreRegistry};
use proptest::prelude::*;

// 2026-10-21 is a Wednesday, so every rule can fire on it.
fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

fn pending_work(count: usize) -> WorkSnapshot {
    WorkSnapshot {
        items: (0..count)
            .map(|i| WorkItem {
                id: Some(format!("w{i}")),
                title: format!("Item {i}"),
                status: Some("pending".into()),
            })
            .collect(),
    }
}

fn open_evening_routine() -> RoutineSnapshot {
    RoutineSnapshot {
        routines: vec![Routine {
            name: "evening".into(),
            items: vec![
                RoutineItem {
                    text: "Stretch".into(),
                    completed: Some(true),
                },
                RoutineItem {
                    text: "Journal".into(),
                    completed: Some(false),
                },
            ],
        }],
    }
}

fn busy_registry() -> StoreRegistry {
    let registry = StoreRegistry::in_memory();
    registry.save(&keys::WORK, pending_work(3));
    registry.save(&keys::ROUTINE, open_evening_routine());
    registry
}

#[test]
fn work_section_with_one_pending_item_shows_task() {
    let registry = StoreRegistry::in_memory();
    registry.save(&keys::WORK, pending_work(1));
    let now = at("2026-10-19T16:00:00+00:00");

    let shown = ReminderEngine::new()
        .run_pass(&registry, &now, &Section::Work, false)
        .expect("task reminder");

    assert_eq!(shown.kind, ReminderKind::Task);
    assert_eq!(shown.message, "One task is still open for today.");
    assert_eq!(shown.related_section, Some(Section::Work));
    assert_eq!(registry.get(&keys::REMINDERS).shown_kinds, vec![ReminderKind::Task]);
}

#[test]
fn message_counts_multiple_open_tasks() {
    let registry = StoreRegistry::in_memory();
    registry.save(&keys::WORK, pending_work(3));
    let now = at("2026-10-19T16:00:00+00:00");
    let shown = ReminderEngine::new()
        .run_pass(&registry, &now, &Section::Work, false)
        .unwrap();
    assert_eq!(shown.message, "3 tasks are still open for today.");
}

#[test]
fn fitness_logged_today_suppresses_fitness_reminder() {
    let registry = StoreRegistry::in_memory();
    let now = at("2026-10-19T19:00:00+00:00");
    registry.save(
        &keys::FITNESS,
        FitnessSnapshot {
            activities: vec![FitnessActivity {
                name: "Morning run".into(),
                timestamp: Some(ActivityTimestamp::Millis(
                    (now - Duration::hours(11)).timestamp_millis(),
                )),
            }],
        },
    );

    let engine = ReminderEngine::new();
    assert!(engine
        .run_pass(&registry, &now, &Section::Fitness, false)
        .is_none());
    assert!(registry.get(&keys::REMINDERS).is_empty());
}

#[test]
fn other_section_candidates_do_not_leak() {
    let registry = busy_registry();
    let now = at("2026-10-21T20:30:00+00:00");
    // Task, fitness and routine are eligible; planning closed at 20:00.
    assert!(ReminderEngine::new()
        .run_pass(&registry, &now, &Section::Planning, false)
        .is_none());
    assert!(ReminderEngine::new()
        .run_pass(&registry, &now, &Section::Other("journal".into()), false)
        .is_none());
}

#[test]
fn daily_cap_stops_third_reminder() {
    let registry = busy_registry();
    let engine = ReminderEngine::new();
    let now = at("2026-10-21T20:30:00+00:00");

    let first = engine.run_pass(&registry, &now, &Section::Dashboard, false).unwrap();
    let second = engine.run_pass(&registry, &now, &Section::Dashboard, false).unwrap();
    assert_eq!(first.kind, ReminderKind::Task);
    assert_eq!(second.kind, ReminderKind::Fitness);

    // Routine is still eligible, but two have been shown today.
    assert!(engine
        .run_pass(&registry, &now, &Section::Routine, false)
        .is_none());
    assert_eq!(registry.get(&keys::REMINDERS).len(), 2);
}

#[test]
fn raised_config_cap_still_stops_at_two() {
    let registry = busy_registry();
    let config = ReminderConfig {
        daily_cap: 4,
        ..ReminderConfig::default()
    };
    let engine = ReminderEngine::from_config(&config);
    let now = at("2026-10-21T20:30:00+00:00");

    for _ in 0..4 {
        engine.run_pass(&registry, &now, &Section::Dashboard, false);
    }
    assert_eq!(
        registry.get(&keys::REMINDERS).shown_kinds,
        vec![ReminderKind::Task, ReminderKind::Fitness]
    );
}

#[test]
fn ledger_resets_on_first_pass_of_a_new_day() {
    let registry = busy_registry();
    let engine = ReminderEngine::new();
    let monday = at("2026-10-19T20:30:00+00:00");
    engine.run_pass(&registry, &monday, &Section::Dashboard, false);
    engine.run_pass(&registry, &monday, &Section::Dashboard, false);
    assert_eq!(registry.get(&keys::REMINDERS).len(), 2);

    let tuesday = at("2026-10-20T15:30:00+00:00");
    let shown = engine
        .run_pass(&registry, &tuesday, &Section::Work, false)
        .unwrap();
    assert_eq!(shown.kind, ReminderKind::Task);

    let ledger = registry.get(&keys::REMINDERS);
    assert_eq!(ledger.shown_kinds, vec![ReminderKind::Task]);
    assert_eq!(ledger.reset_boundary, Some(tuesday.date_naive()));
}

#[test]
fn scheduler_drives_a_full_cycle() {
    let registry = busy_registry();
    let engine = ReminderEngine::new();
    let mut scheduler = ReminderScheduler::new();
    let t0 = at("2026-10-21T20:30:00+00:00");

    // Quick navigation: only the last section gets checked.
    scheduler.section_changed(Section::Work, t0);
    scheduler.section_changed(Section::Routine, t0 + Duration::milliseconds(500));
    assert!(scheduler
        .poll(&engine, &registry, t0 + Duration::seconds(2))
        .is_none());

    let shown = scheduler
        .poll(&engine, &registry, t0 + Duration::milliseconds(2_500))
        .unwrap();
    assert_eq!(shown.kind, ReminderKind::Routine);

    scheduler.dismiss();
    scheduler.section_changed(Section::Work, t0 + Duration::seconds(4));
    let shown = scheduler
        .poll(&engine, &registry, t0 + Duration::seconds(6))
        .unwrap();
    assert_eq!(shown.kind, ReminderKind::Task);

    assert_eq!(
        registry.get(&keys::REMINDERS).shown_kinds,
        vec![ReminderKind::Routine, ReminderKind::Task]
    );
}

fn section_strategy() -> impl Strategy<Value = Section> {
    prop_oneof![
        Just(Section::Dashboard),
        Just(Section::Work),
        Just(Section::Fitness),
        Just(Section::Routine),
        Just(Section::Planning),
    ]
}

proptest! {
    #[test]
    fn ledger_never_exceeds_cap_within_a_day(
        passes in prop::collection::vec((section_strategy(), 0u32..24, any::<bool>()), 1..40),
    ) {
        let registry = busy_registry();
        let engine = ReminderEngine::new();
        let midnight = at("2026-10-21T00:00:00+00:00");

        for (section, hour, showing) in passes {
            let now = midnight + Duration::hours(i64::from(hour));
            engine.run_pass(&registry, &now, &section, showing);
            let ledger = registry.get(&keys::REMINDERS);
            prop_assert!(ledger.len() <= 2);

            let mut kinds = ledger.shown_kinds.clone();
            kinds.sort_by_key(|k| k.as_str());
            kinds.dedup();
            prop_assert_eq!(kinds.len(), ledger.len());
        }
    }
}
