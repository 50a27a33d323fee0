use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A single dated completion attributed to an item. Only ever built on demand
/// from the items themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompletionEvent {
    pub item_id: ItemId,
    pub day: NaiveDate,
}

/// Anything that contributes days to the activity calendar.
pub trait ActivitySource {
    fn id(&self) -> ItemId;
    fn created_at(&self) -> NaiveDateTime;
    fn completion_events(&self) -> Vec<CompletionEvent>;
}

/// Per-item progress as shown in portfolio statistics.
pub trait Progress {
    /// Percentage in `0..=100`.
    fn progress(&self, now: NaiveDateTime) -> u8;
    fn deadline(&self) -> Option<NaiveDate> {
        None
    }
}

pub(crate) fn required(value: &str, field: &'static str) -> crate::error::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::error::TrackerError::missing(field));
    }
    Ok(trimmed.to_string())
}
