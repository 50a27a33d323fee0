use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    deadline::DeadlineStatus,
    goal::Goal,
    habit::Habit,
    item::{ItemId, Progress},
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub average_progress: u8,
    pub due_soon: usize,
}

/// Portfolio statistics over any set of items with a progress percentage.
pub fn portfolio_summary<T: Progress>(
    items: &[T],
    now: NaiveDateTime,
    due_soon_days: u32,
) -> ProgressSummary {
    let today = now.date();
    let mut summary = ProgressSummary {
        total: items.len(),
        ..ProgressSummary::default()
    };
    let mut progress_sum = 0u64;

    for item in items {
        let progress = item.progress(now).min(100);
        progress_sum += u64::from(progress);
        if progress >= 100 {
            summary.completed += 1;
            continue;
        }
        if progress > 0 {
            summary.in_progress += 1;
        }
        if DeadlineStatus::classify(item.deadline(), today).is_within(due_soon_days) {
            summary.due_soon += 1;
        }
    }

    summary.average_progress = rounded_percent(progress_sum, items.len() as u64);
    summary
}

fn rounded_percent(sum: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round().min(100.0) as u8
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: usize,
    pub completed_today: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentCompletion {
    pub item_id: ItemId,
    pub name: String,
    pub day: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitOverview {
    pub total: usize,
    pub completed_today: usize,
    pub today_percent: u8,
    pub best_streak: u32,
    pub average_completion_rate: u8,
    pub total_victories: usize,
    pub categories: BTreeMap<String, CategoryStats>,
    pub recent: Vec<RecentCompletion>,
}

pub fn habit_overview(habits: &[Habit], now: NaiveDateTime, recent_limit: usize) -> HabitOverview {
    let today = now.date();
    let mut overview = HabitOverview {
        total: habits.len(),
        ..HabitOverview::default()
    };
    let mut rate_sum = 0u64;

    for habit in habits {
        let done_today = habit.is_complete_on(today);
        if done_today {
            overview.completed_today += 1;
        }
        let stats = overview.categories.entry(habit.category.clone()).or_default();
        stats.total += 1;
        if done_today {
            stats.completed_today += 1;
        }
        overview.best_streak = overview.best_streak.max(habit.streak.longest);
        overview.total_victories += habit.log.len();
        rate_sum += u64::from(habit.completion_rate(now));
    }

    overview.today_percent = if habits.is_empty() {
        0
    } else {
        (overview.completed_today as f64 / habits.len() as f64 * 100.0).round() as u8
    };
    overview.average_completion_rate = rounded_percent(rate_sum, habits.len() as u64);
    overview.recent = habits
        .iter()
        .filter_map(|habit| {
            habit.log.latest().map(|day| RecentCompletion {
                item_id: habit.id,
                name: habit.display_name(),
                day,
            })
        })
        .take(recent_limit)
        .collect();
    overview
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalOverview {
    pub goals_achieved: usize,
    pub milestones_reached: usize,
    pub categories: BTreeMap<String, usize>,
    pub recent: Vec<RecentCompletion>,
}

pub fn goal_overview(goals: &[Goal], recent_limit: usize) -> GoalOverview {
    let mut finished: Vec<(NaiveDateTime, &Goal)> = goals
        .iter()
        .filter_map(|goal| goal.completed_at.map(|at| (at, goal)))
        .collect();
    finished.sort_by(|a, b| b.0.cmp(&a.0));

    let mut categories = BTreeMap::new();
    for goal in goals {
        *categories.entry(goal.category.clone()).or_insert(0) += 1;
    }

    GoalOverview {
        goals_achieved: finished.len(),
        milestones_reached: goals.iter().map(Goal::completed_milestones).sum(),
        categories,
        recent: finished
            .into_iter()
            .take(recent_limit)
            .map(|(at, goal)| RecentCompletion {
                item_id: goal.id,
                name: goal.title.clone(),
                day: at.date(),
            })
            .collect(),
    }
}
