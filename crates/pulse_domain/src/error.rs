use chrono::NaiveDate;
use thiserror::Error;

use crate::item::ItemId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("missing required field `{field}`")]
    Validation { field: &'static str },

    #[error("day {day} rejected: {reason}")]
    OutOfRange { day: NaiveDate, reason: RangeReason },

    #[error("no tracked item with id {0}")]
    UnknownItem(ItemId),

    #[error("item id {0} appears more than once")]
    DuplicateItem(ItemId),

    #[error("no item ids left to allocate")]
    IdsExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeReason {
    InFuture,
    BeforeCreation,
}

impl std::fmt::Display for RangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeReason::InFuture => f.write_str("day is after today"),
            RangeReason::BeforeCreation => f.write_str("day precedes item creation"),
        }
    }
}

impl TrackerError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::Validation { field }
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
