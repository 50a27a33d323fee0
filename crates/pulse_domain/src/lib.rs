pub mod calendar;
pub mod clock;
pub mod config;
pub mod deadline;
pub mod error;
pub mod event_log;
pub mod goal;
pub mod habit;
pub mod item;
pub mod service;
pub mod streak;
pub mod summary;

pub use crate::error::{Result, TrackerError};
pub use crate::item::ItemId;
pub use crate::service::{TrackerService, TrackerServiceBuilder, TrackerSnapshot};
