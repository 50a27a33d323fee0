use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    deadline::{DeadlineStatus, StatusTone},
    error::{Result, TrackerError},
    item::{required, ActivitySource, CompletionEvent, ItemId, Priority, Progress},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReminderFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmartCriteria {
    pub specific: String,
    pub measurable: String,
    pub achievable: String,
    pub relevant: String,
    pub time_bound: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Milestone {
    pub title: String,
    pub completed: bool,
    pub deadline: Option<NaiveDate>,
}

impl Milestone {
    pub fn new(title: impl Into<String>, deadline: Option<NaiveDate>) -> Self {
        Self {
            title: title.into(),
            completed: false,
            deadline,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub smart: SmartCriteria,
    pub notes: String,
    pub reminder: Option<ReminderFrequency>,
    pub milestones: Vec<Milestone>,
    pub progress: u8,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalDraft {
    pub title: String,
    pub category: String,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub smart: SmartCriteria,
    pub notes: String,
    pub reminder: Option<ReminderFrequency>,
    pub milestones: Vec<Milestone>,
}

impl GoalDraft {
    pub fn new(title: impl Into<String>, category: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    pub fn with_milestone(mut self, title: impl Into<String>, deadline: Option<NaiveDate>) -> Self {
        self.milestones.push(Milestone::new(title, deadline));
        self
    }

    pub(crate) fn validated(self) -> Result<Self> {
        let title = required(&self.title, "title")?;
        let category = required(&self.category, "category")?;
        if self.deadline.is_none() {
            return Err(TrackerError::missing("deadline"));
        }
        Ok(Self {
            title,
            category,
            ..self
        })
    }
}

impl Goal {
    pub(crate) fn create(id: ItemId, draft: GoalDraft, created_at: NaiveDateTime) -> Self {
        let mut goal = Self {
            id,
            title: String::new(),
            category: String::new(),
            priority: Priority::default(),
            deadline: None,
            smart: SmartCriteria::default(),
            notes: String::new(),
            reminder: None,
            milestones: Vec::new(),
            progress: 0,
            created_at,
            completed_at: None,
        };
        goal.apply(draft);
        goal
    }

    /// Replaces the editable fields. Progress and completion time are kept as-is.
    pub(crate) fn apply(&mut self, draft: GoalDraft) {
        self.title = draft.title;
        self.category = draft.category;
        self.priority = draft.priority;
        self.deadline = draft.deadline;
        self.smart = draft.smart;
        self.notes = draft.notes;
        self.reminder = draft.reminder;
        self.milestones = draft.milestones;
    }

    pub fn completed_milestones(&self) -> usize {
        self.milestones.iter().filter(|m| m.completed).count()
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    /// Flips one milestone and derives progress from the completed share.
    pub fn toggle_milestone(&mut self, index: usize) -> Option<u8> {
        let milestone = self.milestones.get_mut(index)?;
        milestone.completed = !milestone.completed;
        self.progress = milestone_progress(self.completed_milestones(), self.milestones.len());
        Some(self.progress)
    }

    pub fn mark_complete(&mut self, now: NaiveDateTime) {
        self.progress = 100;
        for milestone in &mut self.milestones {
            milestone.completed = true;
        }
        self.completed_at = Some(now);
    }

    /// Reverts to in-progress. Milestones keep their state.
    pub fn undo_complete(&mut self) {
        self.progress = self.progress.saturating_sub(100);
        self.completed_at = None;
    }

    pub fn deadline_status(&self, today: NaiveDate) -> DeadlineStatus {
        DeadlineStatus::classify(self.deadline, today)
    }

    pub fn status_tone(&self, today: NaiveDate) -> StatusTone {
        StatusTone::for_item(self.deadline, self.progress, today)
    }
}

fn milestone_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u8
}

impl ActivitySource for Goal {
    fn id(&self) -> ItemId {
        self.id
    }

    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Completed milestones count on their deadline even when it predates `created_at`.
    fn completion_events(&self) -> Vec<CompletionEvent> {
        let finished = self.completed_at.map(|at| at.date());
        let milestones = self
            .milestones
            .iter()
            .filter(|m| m.completed)
            .filter_map(|m| m.deadline);
        finished
            .into_iter()
            .chain(milestones)
            .map(|day| CompletionEvent {
                item_id: self.id,
                day,
            })
            .collect()
    }
}

impl Progress for Goal {
    fn progress(&self, _now: NaiveDateTime) -> u8 {
        self.progress.min(100)
    }

    fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }
}
