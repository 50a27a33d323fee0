use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::item::{ActivitySource, ItemId};

/// Number of calendar months shown, the current month included.
pub const WINDOW_MONTHS: u32 = 12;
pub const MAX_INTENSITY: u8 = 4;
/// Every additional block of this many items raises the count needed per intensity step.
const ITEMS_PER_STEP: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub total_activity_count: u32,
    pub intensity_level: u8,
    /// One entry per completion on this day, in item order.
    pub contributors: Vec<ItemId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalendarSlot {
    Blank,
    Day(CalendarCell),
}

impl CalendarSlot {
    pub fn cell(&self) -> Option<&CalendarCell> {
        match self {
            CalendarSlot::Blank => None,
            CalendarSlot::Day(cell) => Some(cell),
        }
    }
}

/// One month of the heatmap laid out as Sunday-first weeks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthSegment {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub weeks: Vec<[CalendarSlot; 7]>,
}

impl MonthSegment {
    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> + '_ {
        self.weeks
            .iter()
            .flat_map(|week| week.iter())
            .filter_map(CalendarSlot::cell)
    }
}

/// Builds the trailing twelve-month activity grid ending with the month of `today`.
pub fn build_calendar<T: ActivitySource>(items: &[T], today: NaiveDate) -> Vec<MonthSegment> {
    let Some(current_month) = NaiveDate::from_ymd_opt(today.year(), today.month(), 1) else {
        return Vec::new();
    };
    let Some(window_start) = current_month.checked_sub_months(Months::new(WINDOW_MONTHS - 1))
    else {
        return Vec::new();
    };

    let mut activity: BTreeMap<NaiveDate, Vec<ItemId>> = BTreeMap::new();
    for item in items {
        for event in item.completion_events() {
            if event.day >= window_start && event.day <= today {
                activity.entry(event.day).or_default().push(event.item_id);
            }
        }
    }

    (0..WINDOW_MONTHS)
        .filter_map(|offset| window_start.checked_add_months(Months::new(offset)))
        .map(|first| month_segment(first, today, &activity, items.len()))
        .collect()
}

fn month_segment(
    first: NaiveDate,
    today: NaiveDate,
    activity: &BTreeMap<NaiveDate, Vec<ItemId>>,
    item_count: usize,
) -> MonthSegment {
    let days = days_in_month(first);
    let lead = first.weekday().num_days_from_sunday();
    let week_count = (days + lead).div_ceil(7);

    let weeks: Vec<[CalendarSlot; 7]> = (0..week_count)
        .map(|week| {
            std::array::from_fn(|weekday| {
                let slot = week * 7 + weekday as u32;
                if slot < lead || slot - lead >= days {
                    return CalendarSlot::Blank;
                }
                let Some(date) = first.with_day(slot - lead + 1) else {
                    return CalendarSlot::Blank;
                };
                if date > today {
                    return CalendarSlot::Blank;
                }
                let contributors = activity.get(&date).cloned().unwrap_or_default();
                let total = contributors.len() as u32;
                CalendarSlot::Day(CalendarCell {
                    date,
                    total_activity_count: total,
                    intensity_level: intensity_level(total, item_count),
                    contributors,
                })
            })
        })
        .collect();

    MonthSegment {
        year: first.year(),
        month: first.month(),
        label: first.format("%b").to_string(),
        weeks,
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31)
}

/// `min(4, ceil(count / max(1, ceil(items / 10)) * 4))`, zero for idle days.
pub fn intensity_level(count: u32, item_count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    let step = item_count.div_ceil(ITEMS_PER_STEP).max(1) as u64;
    let scaled = (u64::from(count) * u64::from(MAX_INTENSITY)).div_ceil(step);
    scaled.min(u64::from(MAX_INTENSITY)) as u8
}

pub fn find_cell(segments: &[MonthSegment], date: NaiveDate) -> Option<&CalendarCell> {
    segments
        .iter()
        .find(|segment| segment.year == date.year() && segment.month == date.month())
        .and_then(|segment| segment.cells().find(|cell| cell.date == date))
}

pub fn active_days(segments: &[MonthSegment]) -> usize {
    segments
        .iter()
        .flat_map(MonthSegment::cells)
        .filter(|cell| cell.total_activity_count > 0)
        .count()
}
