use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    calendar::{self, MonthSegment},
    clock::{Clock, SystemClock},
    config::TrackerConfig,
    error::{Result, TrackerError},
    event_log::MarkOutcome,
    goal::{Goal, GoalDraft},
    habit::{Habit, HabitDraft},
    item::ItemId,
    streak::StreakState,
    summary::{self, GoalOverview, HabitOverview, ProgressSummary},
};

/// Category filter value that matches every item.
pub const ALL_CATEGORIES: &str = "All";

/// Everything an external store needs to persist, verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub habits: Vec<Habit>,
    pub goals: Vec<Goal>,
}

/// Every derived view, computed from one consistent read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub habit_calendar: Vec<MonthSegment>,
    pub goal_calendar: Vec<MonthSegment>,
    pub habit_summary: ProgressSummary,
    pub goal_summary: ProgressSummary,
    pub habit_overview: HabitOverview,
    pub goal_overview: GoalOverview,
}

#[derive(Debug, Default)]
struct TrackerState {
    habits: Vec<Habit>,
    goals: Vec<Goal>,
    next_id: u64,
}

impl TrackerState {
    fn allocate_id(&mut self) -> Result<ItemId> {
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(TrackerError::IdsExhausted)?;
        Ok(ItemId(self.next_id))
    }

    fn habit_mut(&mut self, id: ItemId) -> Result<&mut Habit> {
        self.habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or(TrackerError::UnknownItem(id))
    }

    fn goal_mut(&mut self, id: ItemId) -> Result<&mut Goal> {
        self.goals
            .iter_mut()
            .find(|goal| goal.id == id)
            .ok_or(TrackerError::UnknownItem(id))
    }
}

/// Owner of all tracked habits and goals.
///
/// Each mutation takes the write lock once and either applies fully or leaves
/// the state untouched. Derived views are recomputed on every read.
pub struct TrackerService {
    state: RwLock<TrackerState>,
    clock: Box<dyn Clock>,
    config: TrackerConfig,
}

pub struct TrackerServiceBuilder {
    clock: Option<Box<dyn Clock>>,
    config: TrackerConfig,
    snapshot: Option<TrackerSnapshot>,
}

impl Default for TrackerServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerServiceBuilder {
    pub fn new() -> Self {
        Self {
            clock: None,
            config: TrackerConfig::default(),
            snapshot: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_snapshot(mut self, snapshot: TrackerSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn build(self) -> Result<TrackerService> {
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        let mut state = TrackerState::default();
        if let Some(snapshot) = self.snapshot {
            Self::import(&mut state, snapshot, clock.today())?;
        }
        Ok(TrackerService {
            state: RwLock::new(state),
            clock,
            config: self.config,
        })
    }

    fn import(state: &mut TrackerState, snapshot: TrackerSnapshot, today: NaiveDate) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        let ids = snapshot
            .habits
            .iter()
            .map(|habit| habit.id)
            .chain(snapshot.goals.iter().map(|goal| goal.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(TrackerError::DuplicateItem(id));
            }
        }

        state.habits = snapshot.habits;
        state.goals = snapshot.goals;
        for habit in &mut state.habits {
            let dropped = habit.log.retain_range(habit.created_at.date(), today);
            if dropped > 0 {
                warn!(id = %habit.id, dropped, "discarded out-of-range completion days");
            }
        }
        state.next_id = seen.last().map(|id| id.0).unwrap_or(0);
        info!(
            habits = state.habits.len(),
            goals = state.goals.len(),
            "imported tracker snapshot"
        );
        Ok(())
    }
}

impl TrackerService {
    pub fn builder() -> TrackerServiceBuilder {
        TrackerServiceBuilder::new()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // Habits

    #[instrument(skip(self))]
    pub fn create_habit(&self, draft: HabitDraft) -> Result<Habit> {
        let draft = draft.validated()?;
        let mut state = self.state.write();
        let id = state.allocate_id()?;
        let habit = Habit::create(id, draft, self.clock.now());
        state.habits.push(habit.clone());
        info!(%id, name = %habit.name, "created habit");
        Ok(habit)
    }

    /// Edits the descriptive fields. Returns `Ok(None)` for unknown ids.
    #[instrument(skip(self))]
    pub fn update_habit(&self, id: ItemId, draft: HabitDraft) -> Result<Option<Habit>> {
        let draft = draft.validated()?;
        let mut state = self.state.write();
        match state.habit_mut(id) {
            Ok(habit) => {
                habit.apply(draft);
                Ok(Some(habit.clone()))
            }
            Err(err) => {
                debug!(%err, "ignoring habit update");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    pub fn delete_habit(&self, id: ItemId) -> bool {
        let mut state = self.state.write();
        let before = state.habits.len();
        state.habits.retain(|habit| habit.id != id);
        let removed = state.habits.len() != before;
        if removed {
            info!(%id, "deleted habit");
        }
        removed
    }

    pub fn habit(&self, id: ItemId) -> Option<Habit> {
        self.state
            .read()
            .habits
            .iter()
            .find(|habit| habit.id == id)
            .cloned()
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.state.read().habits.clone()
    }

    pub fn habits_in_category(&self, category: &str) -> Vec<Habit> {
        let state = self.state.read();
        if category == ALL_CATEGORIES {
            return state.habits.clone();
        }
        state
            .habits
            .iter()
            .filter(|habit| habit.category == category)
            .cloned()
            .collect()
    }

    /// Flips today's completion for a habit and returns its updated streak.
    #[instrument(skip(self))]
    pub fn toggle_completion(&self, id: ItemId) -> Option<StreakState> {
        let now = self.clock.now();
        let today = now.date();
        let mut state = self.state.write();
        let habit = match state.habit_mut(id) {
            Ok(habit) => habit,
            Err(err) => {
                debug!(%err, "ignoring toggle");
                return None;
            }
        };
        if habit.is_complete_on(today) {
            habit.unmark(today);
        } else if let MarkOutcome::Rejected(err) = habit.mark_complete(today, today) {
            debug!(%err, "toggle rejected");
        }
        Some(habit.streak_state(now))
    }

    /// Records a completion for `day`. Future or pre-creation days are dropped.
    #[instrument(skip(self))]
    pub fn mark_complete(&self, id: ItemId, day: NaiveDate) -> Option<StreakState> {
        let now = self.clock.now();
        let mut state = self.state.write();
        let habit = match state.habit_mut(id) {
            Ok(habit) => habit,
            Err(err) => {
                debug!(%err, "ignoring completion");
                return None;
            }
        };
        if let MarkOutcome::Rejected(err) = habit.mark_complete(day, now.date()) {
            debug!(%err, "completion clamped");
        }
        Some(habit.streak_state(now))
    }

    #[instrument(skip(self))]
    pub fn unmark(&self, id: ItemId, day: NaiveDate) -> Option<StreakState> {
        let now = self.clock.now();
        let mut state = self.state.write();
        let habit = match state.habit_mut(id) {
            Ok(habit) => habit,
            Err(err) => {
                debug!(%err, "ignoring unmark");
                return None;
            }
        };
        habit.unmark(day);
        Some(habit.streak_state(now))
    }

    pub fn is_complete(&self, id: ItemId, day: NaiveDate) -> bool {
        self.state
            .read()
            .habits
            .iter()
            .find(|habit| habit.id == id)
            .map(|habit| habit.is_complete_on(day))
            .unwrap_or(false)
    }

    pub fn streak(&self, id: ItemId) -> Option<StreakState> {
        let now = self.clock.now();
        self.state
            .read()
            .habits
            .iter()
            .find(|habit| habit.id == id)
            .map(|habit| habit.streak_state(now))
    }

    // Goals

    #[instrument(skip(self))]
    pub fn create_goal(&self, draft: GoalDraft) -> Result<Goal> {
        let draft = draft.validated()?;
        let mut state = self.state.write();
        let id = state.allocate_id()?;
        let goal = Goal::create(id, draft, self.clock.now());
        state.goals.push(goal.clone());
        info!(%id, title = %goal.title, "created goal");
        Ok(goal)
    }

    #[instrument(skip(self))]
    pub fn update_goal(&self, id: ItemId, draft: GoalDraft) -> Result<Option<Goal>> {
        let draft = draft.validated()?;
        let mut state = self.state.write();
        match state.goal_mut(id) {
            Ok(goal) => {
                goal.apply(draft);
                Ok(Some(goal.clone()))
            }
            Err(err) => {
                debug!(%err, "ignoring goal update");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    pub fn delete_goal(&self, id: ItemId) -> bool {
        let mut state = self.state.write();
        let before = state.goals.len();
        state.goals.retain(|goal| goal.id != id);
        let removed = state.goals.len() != before;
        if removed {
            info!(%id, "deleted goal");
        }
        removed
    }

    pub fn goal(&self, id: ItemId) -> Option<Goal> {
        self.state
            .read()
            .goals
            .iter()
            .find(|goal| goal.id == id)
            .cloned()
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.state.read().goals.clone()
    }

    /// Flips a milestone and returns the goal's new progress.
    #[instrument(skip(self))]
    pub fn toggle_milestone(&self, id: ItemId, index: usize) -> Option<u8> {
        let mut state = self.state.write();
        let goal = state.goal_mut(id).ok()?;
        let progress = goal.toggle_milestone(index);
        if progress.is_none() {
            debug!(%id, index, "no such milestone");
        }
        progress
    }

    #[instrument(skip(self))]
    pub fn mark_goal_complete(&self, id: ItemId) -> Option<Goal> {
        let now = self.clock.now();
        let mut state = self.state.write();
        let goal = state.goal_mut(id).ok()?;
        goal.mark_complete(now);
        Some(goal.clone())
    }

    #[instrument(skip(self))]
    pub fn undo_goal_complete(&self, id: ItemId) -> Option<Goal> {
        let mut state = self.state.write();
        let goal = state.goal_mut(id).ok()?;
        goal.undo_complete();
        Some(goal.clone())
    }

    // Derived views

    pub fn habit_calendar(&self) -> Vec<MonthSegment> {
        calendar::build_calendar(&self.state.read().habits, self.today())
    }

    pub fn goal_calendar(&self) -> Vec<MonthSegment> {
        calendar::build_calendar(&self.state.read().goals, self.today())
    }

    pub fn habit_summary(&self) -> ProgressSummary {
        summary::portfolio_summary(
            &self.state.read().habits,
            self.now(),
            self.config.due_soon_days,
        )
    }

    pub fn goal_summary(&self) -> ProgressSummary {
        summary::portfolio_summary(
            &self.state.read().goals,
            self.now(),
            self.config.due_soon_days,
        )
    }

    pub fn dashboard(&self) -> Dashboard {
        let now = self.now();
        let today = now.date();
        let state = self.state.read();
        Dashboard {
            today,
            habit_calendar: calendar::build_calendar(&state.habits, today),
            goal_calendar: calendar::build_calendar(&state.goals, today),
            habit_summary: summary::portfolio_summary(
                &state.habits,
                now,
                self.config.due_soon_days,
            ),
            goal_summary: summary::portfolio_summary(
                &state.goals,
                now,
                self.config.due_soon_days,
            ),
            habit_overview: summary::habit_overview(&state.habits, now, self.config.recent_limit),
            goal_overview: summary::goal_overview(&state.goals, self.config.recent_limit),
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.read();
        TrackerSnapshot {
            habits: state.habits.clone(),
            goals: state.goals.clone(),
        }
    }
}
