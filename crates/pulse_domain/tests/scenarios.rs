use std::fs;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use pulse_domain::{
    calendar::{self, find_cell},
    clock::{Clock, FixedClock},
    deadline::DeadlineStatus,
    goal::GoalDraft,
    habit::HabitDraft,
    TrackerService, TrackerSnapshot,
};
use tempfile::tempdir;

fn morning(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn service_at(now: NaiveDateTime) -> (TrackerService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now));
    let service = TrackerService::builder()
        .with_clock(Arc::clone(&clock))
        .build()
        .expect("build tracker service");
    (service, clock)
}

#[test]
fn streak_survives_days_without_explicit_unmark() {
    let (service, clock) = service_at(morning(2026, 10, 9));
    let id = service
        .create_habit(HabitDraft::named("Meditate"))
        .expect("create habit")
        .id;

    for _ in 0..3 {
        service.toggle_completion(id).expect("habit exists");
        clock.advance_days(1);
    }
    clock.set(morning(2026, 10, 19));

    let state = service.streak(id).expect("habit exists");
    assert_eq!(state.current, 3);
    assert_eq!(state.longest, 3);
    assert_eq!(state.completion_rate, 30);
}

#[test]
fn backfilled_day_extends_current_streak() {
    let (service, clock) = service_at(morning(2026, 10, 1));
    let id = service.create_habit(HabitDraft::named("Piano")).unwrap().id;
    clock.set(morning(2026, 10, 5));

    service.mark_complete(id, NaiveDate::from_ymd_opt(2026, 10, 2).unwrap());
    let state = service
        .mark_complete(id, NaiveDate::from_ymd_opt(2026, 10, 4).unwrap())
        .unwrap();
    assert_eq!(state.current, 2);

    let again = service
        .mark_complete(id, NaiveDate::from_ymd_opt(2026, 10, 4).unwrap())
        .unwrap();
    assert_eq!(again.current, 2);
}

#[test]
fn intensity_saturates_for_small_portfolios() {
    let (service, clock) = service_at(morning(2026, 10, 19));
    let ids: Vec<_> = (0..5)
        .map(|n| {
            service
                .create_habit(HabitDraft::named(format!("Habit {n}")))
                .unwrap()
                .id
        })
        .collect();
    service.toggle_completion(ids[0]);
    service.toggle_completion(ids[3]);

    let grid = service.habit_calendar();
    assert_eq!(grid.len(), 12);
    let cell = find_cell(&grid, clock.today()).expect("today rendered");
    assert_eq!(cell.total_activity_count, 2);
    assert_eq!(cell.intensity_level, 4);
}

#[test]
fn goal_deadlines_and_due_soon_count() {
    let (service, clock) = service_at(morning(2026, 10, 19));
    let today = clock.today();
    let in_three = service
        .create_goal(GoalDraft::new("Portfolio site", "Career", today + Duration::days(3)))
        .unwrap();
    let late = service
        .create_goal(GoalDraft::new("Tax return", "Finance", today - Duration::days(1)))
        .unwrap();
    let due_now = service
        .create_goal(GoalDraft::new("Call bank", "Finance", today))
        .unwrap();
    service
        .create_goal(GoalDraft::new("Trip", "Travel", today + Duration::days(30)))
        .unwrap();

    assert_eq!(in_three.deadline_status(today).to_string(), "3 days left");
    assert_eq!(late.deadline_status(today).to_string(), "1 days overdue");
    assert_eq!(due_now.deadline_status(today), DeadlineStatus::DueToday);
    assert_eq!(due_now.deadline_status(today).to_string(), "Due today");

    assert_eq!(service.goal_summary().due_soon, 2);
    service.mark_goal_complete(in_three.id).unwrap();
    let summary = service.goal_summary();
    assert_eq!(summary.due_soon, 1);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.average_progress, 25);
}

#[test]
fn goal_calendar_counts_completions_and_milestones() {
    let (service, clock) = service_at(morning(2026, 10, 19));
    let today = clock.today();
    let yesterday = today - Duration::days(1);
    let goal = service
        .create_goal(
            GoalDraft::new("Learn Spanish", "Learning", today + Duration::days(60))
                .with_milestone("A1", Some(yesterday))
                .with_milestone("A2", Some(today + Duration::days(20))),
        )
        .unwrap();

    assert_eq!(service.toggle_milestone(goal.id, 0), Some(50));
    let grid = service.goal_calendar();
    assert_eq!(find_cell(&grid, yesterday).unwrap().total_activity_count, 1);
    assert_eq!(find_cell(&grid, today).unwrap().total_activity_count, 0);

    service.mark_goal_complete(goal.id);
    let grid = service.goal_calendar();
    assert_eq!(find_cell(&grid, today).unwrap().total_activity_count, 1);
    assert_eq!(calendar::active_days(&grid), 2);

    let overview = service.dashboard().goal_overview;
    assert_eq!(overview.goals_achieved, 1);
    assert_eq!(overview.milestones_reached, 2);
}

#[test]
fn deleting_an_item_removes_all_of_its_activity() {
    let (service, clock) = service_at(morning(2026, 10, 17));
    let keep = service.create_habit(HabitDraft::named("Keep")).unwrap().id;
    let drop = service.create_habit(HabitDraft::named("Drop")).unwrap().id;
    for _ in 0..3 {
        service.toggle_completion(keep);
        service.toggle_completion(drop);
        clock.advance_days(1);
    }
    clock.advance_days(-1);

    let before = service.habit_calendar();
    assert_eq!(find_cell(&before, clock.today()).unwrap().total_activity_count, 2);
    assert!(service.delete_habit(drop));

    let after = service.habit_calendar();
    for cell in after.iter().flat_map(|segment| segment.cells()) {
        assert!(!cell.contributors.contains(&drop));
    }
    assert_eq!(find_cell(&after, clock.today()).unwrap().total_activity_count, 1);
    let summary = service.habit_summary();
    assert_eq!(summary.total, 1);
    assert_eq!(service.dashboard().habit_overview.total_victories, 3);
}

#[test]
fn rates_and_streaks_stay_in_bounds_under_churn() {
    let (service, clock) = service_at(morning(2026, 1, 1));
    let id = service.create_habit(HabitDraft::named("Churn")).unwrap().id;
    for step in 0..90 {
        if step % 4 != 3 {
            service.toggle_completion(id);
        }
        if step % 7 == 0 {
            service.toggle_completion(id);
        }
        let state = service.streak(id).unwrap();
        assert!(state.completion_rate <= 100);
        assert!(state.longest >= state.current);
        clock.advance_days(1);
    }
}

#[test]
fn calendar_is_deterministic() {
    let (service, _) = service_at(morning(2026, 3, 31));
    let id = service.create_habit(HabitDraft::named("Same")).unwrap().id;
    service.toggle_completion(id);
    let first = serde_json::to_string(&service.habit_calendar()).unwrap();
    let second = serde_json::to_string(&service.habit_calendar()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn snapshot_file_restores_identical_dashboard() {
    let (service, clock) = service_at(morning(2026, 10, 10));
    let habit = service.create_habit(HabitDraft::named("Stretch")).unwrap();
    service.toggle_completion(habit.id);
    service
        .create_goal(GoalDraft::new("Marathon", "Health & Wellness", clock.today()))
        .unwrap();

    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("tracker.json");
    fs::write(&path, serde_json::to_vec_pretty(&service.snapshot()).unwrap())
        .expect("write snapshot");

    let snapshot: TrackerSnapshot =
        serde_json::from_slice(&fs::read(&path).expect("read snapshot")).expect("parse snapshot");
    let restored = TrackerService::builder()
        .with_clock(Arc::clone(&clock))
        .with_snapshot(snapshot)
        .build()
        .expect("restore");

    assert_eq!(restored.dashboard(), service.dashboard());
}

#[test]
fn imported_out_of_range_days_are_dropped() {
    let (service, clock) = service_at(morning(2026, 10, 10));
    let id = service.create_habit(HabitDraft::named("Swim")).unwrap().id;
    service.toggle_completion(id);

    let future = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
    let before_creation = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
    let mut stored = serde_json::to_value(service.snapshot()).unwrap();
    let log = stored["habits"][0]["log"].as_array_mut().expect("log is a list");
    log.push(serde_json::json!(future));
    log.push(serde_json::json!(before_creation));
    let snapshot: TrackerSnapshot = serde_json::from_value(stored).unwrap();
    assert_eq!(snapshot.habits[0].log.len(), 3);

    clock.set(morning(2026, 10, 12));
    let restored = TrackerService::builder()
        .with_clock(Arc::clone(&clock))
        .with_snapshot(snapshot)
        .build()
        .expect("restore");

    assert!(restored.is_complete(id, NaiveDate::from_ymd_opt(2026, 10, 10).unwrap()));
    assert!(!restored.is_complete(id, future));
    assert!(!restored.is_complete(id, before_creation));

    let grid = restored.habit_calendar();
    assert_eq!(find_cell(&grid, before_creation).unwrap().total_activity_count, 0);
    assert!(find_cell(&grid, future).is_none());
    assert_eq!(calendar::active_days(&grid), 1);
    assert_eq!(restored.streak(id).unwrap().completion_rate, 50);
}
