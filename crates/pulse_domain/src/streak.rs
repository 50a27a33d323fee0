use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Event-driven streak counter.
///
/// `current` grows by one on every toggle that records a new day and drops to
/// zero on every toggle that removes one. It is never rebuilt from the log, so
/// backfilled days count exactly like same-day completions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakCounter {
    pub current: u32,
    pub longest: u32,
}

impl StreakCounter {
    pub fn record_completion(&mut self) {
        self.current = self.current.saturating_add(1);
        self.longest = self.longest.max(self.current);
    }

    pub fn record_reset(&mut self) {
        self.current = 0;
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub completion_rate: u8,
}

impl StreakState {
    pub fn compute(
        counter: StreakCounter,
        completed_days: usize,
        created_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            current: counter.current,
            longest: counter.longest.max(counter.current),
            completion_rate: completion_rate(completed_days, created_at, now),
        }
    }
}

/// Whole days elapsed since creation, rounded up, never below one.
pub fn days_since_creation(created_at: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let seconds = (now - created_at).num_seconds().abs();
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    days.max(1)
}

pub fn completion_rate(completed_days: usize, created_at: NaiveDateTime, now: NaiveDateTime) -> u8 {
    if completed_days == 0 {
        return 0;
    }
    let span = days_since_creation(created_at, now) as f64;
    let rate = (completed_days as f64 / span * 100.0).round();
    rate.clamp(0.0, 100.0) as u8
}
