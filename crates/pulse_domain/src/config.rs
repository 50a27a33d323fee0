use serde::{Deserialize, Serialize};

pub const DEFAULT_DUE_SOON_DAYS: u32 = 7;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Tunables for the derived views. Nothing here affects stored state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Deadlines at most this many days away count as "due soon".
    pub due_soon_days: u32,
    /// Length of the recent-activity lists in the overviews.
    pub recent_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}
