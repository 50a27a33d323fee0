use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RangeReason, TrackerError};

/// Set of calendar days on which an item was marked complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EventLog {
    days: BTreeSet<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Recorded,
    AlreadyComplete,
    Rejected(TrackerError),
}

impl MarkOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, MarkOutcome::Recorded)
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `day` unless it lies after `today` or before `earliest`.
    pub fn mark_complete(
        &mut self,
        day: NaiveDate,
        today: NaiveDate,
        earliest: NaiveDate,
    ) -> MarkOutcome {
        if day > today {
            return MarkOutcome::Rejected(TrackerError::OutOfRange {
                day,
                reason: RangeReason::InFuture,
            });
        }
        if day < earliest {
            return MarkOutcome::Rejected(TrackerError::OutOfRange {
                day,
                reason: RangeReason::BeforeCreation,
            });
        }
        if self.days.insert(day) {
            MarkOutcome::Recorded
        } else {
            MarkOutcome::AlreadyComplete
        }
    }

    pub fn unmark(&mut self, day: NaiveDate) -> bool {
        self.days.remove(&day)
    }

    pub fn is_complete(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    /// Drops days outside `earliest..=today`. Used when importing snapshots.
    pub(crate) fn retain_range(&mut self, earliest: NaiveDate, today: NaiveDate) -> usize {
        let before = self.days.len();
        self.days.retain(|day| *day >= earliest && *day <= today);
        before - self.days.len()
    }
}
