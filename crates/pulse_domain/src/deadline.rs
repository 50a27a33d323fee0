use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeadlineStatus {
    Overdue(u32),
    DueToday,
    DueTomorrow,
    DueIn(u32),
    NoDeadline,
}

impl DeadlineStatus {
    pub fn classify(deadline: Option<NaiveDate>, today: NaiveDate) -> Self {
        let Some(deadline) = deadline else {
            return Self::NoDeadline;
        };
        let days = (deadline - today).num_days();
        match days {
            d if d < 0 => Self::Overdue(d.unsigned_abs() as u32),
            0 => Self::DueToday,
            1 => Self::DueTomorrow,
            d => Self::DueIn(d as u32),
        }
    }

    /// Days until the deadline; negative when overdue.
    pub fn days_remaining(&self) -> Option<i64> {
        match *self {
            Self::Overdue(days) => Some(-i64::from(days)),
            Self::DueToday => Some(0),
            Self::DueTomorrow => Some(1),
            Self::DueIn(days) => Some(i64::from(days)),
            Self::NoDeadline => None,
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, Self::Overdue(_))
    }

    /// Inside `0..=window` days and not yet overdue.
    pub fn is_within(&self, window: u32) -> bool {
        self.days_remaining()
            .map(|days| (0..=i64::from(window)).contains(&days))
            .unwrap_or(false)
    }
}

impl fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue(days) => write!(f, "{days} days overdue"),
            Self::DueToday => f.write_str("Due today"),
            Self::DueTomorrow => f.write_str("Due tomorrow"),
            Self::DueIn(days) => write!(f, "{days} days left"),
            Self::NoDeadline => f.write_str("No deadline"),
        }
    }
}

/// Colouring bucket for an item, highest precedence first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusTone {
    Complete,
    Overdue,
    DueSoon,
    Normal,
}

impl StatusTone {
    pub fn for_item(deadline: Option<NaiveDate>, progress: u8, today: NaiveDate) -> Self {
        if progress >= 100 {
            return Self::Complete;
        }
        let status = DeadlineStatus::classify(deadline, today);
        if status.is_overdue() {
            Self::Overdue
        } else if status.is_within(1) {
            Self::DueSoon
        } else {
            Self::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 30).unwrap()
    }

    #[test]
    fn labels_follow_day_difference() {
        let t = today();
        let label = |offset: i64| {
            DeadlineStatus::classify(Some(t + Duration::days(offset)), t).to_string()
        };
        assert_eq!(label(3), "3 days left");
        assert_eq!(label(-1), "1 days overdue");
        assert_eq!(label(0), "Due today");
        assert_eq!(label(1), "Due tomorrow");
        assert_eq!(DeadlineStatus::classify(None, t).to_string(), "No deadline");
    }

    #[test]
    fn classification_crosses_year_boundary() {
        let deadline = NaiveDate::from_ymd_opt(2027, 1, 4).unwrap();
        assert_eq!(
            DeadlineStatus::classify(Some(deadline), today()),
            DeadlineStatus::DueIn(5)
        );
    }

    #[test]
    fn window_excludes_overdue_and_far_deadlines() {
        assert!(DeadlineStatus::DueToday.is_within(7));
        assert!(DeadlineStatus::DueIn(7).is_within(7));
        assert!(!DeadlineStatus::DueIn(8).is_within(7));
        assert!(!DeadlineStatus::Overdue(1).is_within(7));
        assert!(!DeadlineStatus::NoDeadline.is_within(7));
    }

    #[test]
    fn tone_precedence() {
        let t = today();
        let yesterday = Some(t - Duration::days(1));
        assert_eq!(StatusTone::for_item(yesterday, 100, t), StatusTone::Complete);
        assert_eq!(StatusTone::for_item(yesterday, 40, t), StatusTone::Overdue);
        assert_eq!(StatusTone::for_item(Some(t), 40, t), StatusTone::DueSoon);
        assert_eq!(
            StatusTone::for_item(Some(t + Duration::days(1)), 40, t),
            StatusTone::DueSoon
        );
        assert_eq!(
            StatusTone::for_item(Some(t + Duration::days(5)), 40, t),
            StatusTone::Normal
        );
        assert_eq!(StatusTone::for_item(None, 0, t), StatusTone::Normal);
    }
}
