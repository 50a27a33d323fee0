use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    event_log::{EventLog, MarkOutcome},
    item::{required, ActivitySource, CompletionEvent, ItemId, Priority, Progress},
    streak::{completion_rate, StreakCounter, StreakState},
};

pub const DEFAULT_TARGET_DAYS: u32 = 21;
pub const MAX_TARGET_DAYS: u32 = 365;

/// Intended completion frequency. Stored for display; streaks always count days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Cadence {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: ItemId,
    pub name: String,
    pub emoji: String,
    pub category: String,
    pub priority: Priority,
    pub cadence: Cadence,
    pub reminder_time: Option<NaiveTime>,
    pub target: u32,
    pub created_at: NaiveDateTime,
    pub log: EventLog,
    pub streak: StreakCounter,
    pub missed_days: u32,
}

/// User-supplied fields for creating or editing a habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub emoji: String,
    pub category: String,
    pub priority: Priority,
    pub cadence: Cadence,
    pub reminder_time: Option<NaiveTime>,
    pub target: u32,
}

impl Default for HabitDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            emoji: "🎯".to_string(),
            category: "Productivity".to_string(),
            priority: Priority::Medium,
            cadence: Cadence::Daily,
            reminder_time: None,
            target: DEFAULT_TARGET_DAYS,
        }
    }
}

impl HabitDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_target(mut self, target: u32) -> Self {
        self.target = target;
        self
    }

    pub(crate) fn validated(self) -> Result<ValidHabitDraft> {
        Ok(ValidHabitDraft {
            name: required(&self.name, "name")?,
            category: required(&self.category, "category")?,
            emoji: self.emoji.trim().to_string(),
            priority: self.priority,
            cadence: self.cadence,
            reminder_time: self.reminder_time,
            target: self.target.clamp(1, MAX_TARGET_DAYS),
        })
    }
}

pub(crate) struct ValidHabitDraft {
    name: String,
    emoji: String,
    category: String,
    priority: Priority,
    cadence: Cadence,
    reminder_time: Option<NaiveTime>,
    target: u32,
}

impl Habit {
    pub(crate) fn create(id: ItemId, draft: ValidHabitDraft, created_at: NaiveDateTime) -> Self {
        let mut habit = Self {
            id,
            name: String::new(),
            emoji: String::new(),
            category: String::new(),
            priority: Priority::default(),
            cadence: Cadence::default(),
            reminder_time: None,
            target: DEFAULT_TARGET_DAYS,
            created_at,
            log: EventLog::new(),
            streak: StreakCounter::default(),
            missed_days: 0,
        };
        habit.apply(draft);
        habit
    }

    pub(crate) fn apply(&mut self, draft: ValidHabitDraft) {
        self.name = draft.name;
        self.emoji = draft.emoji;
        self.category = draft.category;
        self.priority = draft.priority;
        self.cadence = draft.cadence;
        self.reminder_time = draft.reminder_time;
        self.target = draft.target;
    }

    pub fn display_name(&self) -> String {
        if self.emoji.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.emoji, self.name)
        }
    }

    pub fn is_complete_on(&self, day: NaiveDate) -> bool {
        self.log.is_complete(day)
    }

    /// Records `day` and bumps the streak when the log actually changed.
    pub fn mark_complete(&mut self, day: NaiveDate, today: NaiveDate) -> MarkOutcome {
        let outcome = self.log.mark_complete(day, today, self.created_at.date());
        if outcome.changed() {
            self.streak.record_completion();
        }
        outcome
    }

    /// Removes `day`; a removal resets the current streak and counts as a miss.
    pub fn unmark(&mut self, day: NaiveDate) -> bool {
        let removed = self.log.unmark(day);
        if removed {
            self.streak.record_reset();
            self.missed_days = self.missed_days.saturating_add(1);
        }
        removed
    }

    pub fn streak_state(&self, now: NaiveDateTime) -> StreakState {
        StreakState::compute(self.streak, self.log.len(), self.created_at, now)
    }

    pub fn completion_rate(&self, now: NaiveDateTime) -> u8 {
        completion_rate(self.log.len(), self.created_at, now)
    }
}

impl ActivitySource for Habit {
    fn id(&self) -> ItemId {
        self.id
    }

    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    fn completion_events(&self) -> Vec<CompletionEvent> {
        self.log
            .days()
            .map(|day| CompletionEvent {
                item_id: self.id,
                day,
            })
            .collect()
    }
}

impl Progress for Habit {
    fn progress(&self, now: NaiveDateTime) -> u8 {
        self.completion_rate(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn habit() -> Habit {
        let draft = HabitDraft::named("Stretch").validated().unwrap();
        Habit::create(ItemId(1), draft, created())
    }

    #[test]
    fn draft_requires_name_and_category() {
        let missing_name = HabitDraft::default().validated();
        assert_eq!(
            missing_name.err(),
            Some(TrackerError::Validation { field: "name" })
        );
        let missing_category = HabitDraft::named("Read").with_category(" ").validated();
        assert_eq!(
            missing_category.err(),
            Some(TrackerError::Validation { field: "category" })
        );
    }

    #[test]
    fn target_is_clamped_into_supported_range() {
        let draft = HabitDraft::named("Walk").with_target(0).validated().unwrap();
        assert_eq!(Habit::create(ItemId(2), draft, created()).target, 1);
        let draft = HabitDraft::named("Walk").with_target(900).validated().unwrap();
        assert_eq!(Habit::create(ItemId(3), draft, created()).target, 365);
    }

    #[test]
    fn repeated_marks_do_not_double_increment() {
        let mut habit = habit();
        let today = created().date();
        assert!(habit.mark_complete(today, today).changed());
        assert!(!habit.mark_complete(today, today).changed());
        assert_eq!(habit.streak.current, 1);
        assert_eq!(habit.log.len(), 1);
    }

    #[test]
    fn unmark_resets_current_but_keeps_longest() {
        let mut habit = habit();
        let first = created().date();
        let second = first.succ_opt().unwrap();
        habit.mark_complete(first, second);
        habit.mark_complete(second, second);
        assert!(habit.unmark(second));
        assert_eq!(habit.streak.current, 0);
        assert_eq!(habit.streak.longest, 2);
        assert_eq!(habit.missed_days, 1);
        assert!(!habit.unmark(second));
        assert_eq!(habit.missed_days, 1);
    }

    #[test]
    fn display_name_prefixes_emoji() {
        assert_eq!(habit().display_name(), "🎯 Stretch");
    }
}
