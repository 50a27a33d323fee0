use std::fmt::{self, Write as _};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pulse_domain::{
    calendar::{CalendarSlot, MonthSegment},
    clock::FixedClock,
    config::TrackerConfig,
    service::Dashboard,
    TrackerService, TrackerSnapshot,
};
use tracing::{debug, info, warn};

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub(crate) snapshot: Option<PathBuf>,
    pub(crate) today: Option<NaiveDate>,
    pub(crate) tracker: TrackerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Reads `PULSE_*` settings through `lookup`. Unparsable values are skipped
    /// with a warning and leave the remaining settings intact.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("PULSE_SNAPSHOT") {
            if !path.trim().is_empty() {
                config.snapshot = Some(PathBuf::from(path));
            }
        }
        if let Some(today) = lookup("PULSE_TODAY") {
            match NaiveDate::parse_from_str(today.trim(), "%Y-%m-%d") {
                Ok(parsed) => config.today = Some(parsed),
                Err(err) => warn!(%today, %err, "ignoring PULSE_TODAY, expected YYYY-MM-DD"),
            }
        }
        if let Some(days) = lookup("PULSE_DUE_SOON_DAYS") {
            match days.trim().parse::<u32>() {
                Ok(value) => config.tracker.due_soon_days = value,
                Err(err) => warn!(%days, %err, "ignoring PULSE_DUE_SOON_DAYS"),
            }
        }
        config
    }

    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

pub fn build_service(config: &AppConfig) -> Result<TrackerService> {
    let mut builder = TrackerService::builder().with_config(config.tracker.clone());
    if let Some(today) = config.today {
        debug!(%today, "pinning clock");
        builder = builder.with_clock(FixedClock::at_start_of(today));
    }
    if let Some(path) = &config.snapshot {
        let bytes = std::fs::read(path)
            .with_context(|| format!("unable to read snapshot `{}`", path.display()))?;
        let snapshot: TrackerSnapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("snapshot `{}` is not valid JSON", path.display()))?;
        info!(path = %path.display(), "loading snapshot");
        builder = builder.with_snapshot(snapshot);
    }
    Ok(builder.build()?)
}

pub fn run(config: AppConfig) -> Result<()> {
    let service = build_service(&config)?;
    let dashboard = service.dashboard();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(render_dashboard(&dashboard)?.as_bytes())?;
    out.flush()?;
    Ok(())
}

pub fn render_dashboard(dashboard: &Dashboard) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Pulse · {}", dashboard.today.format("%a %b %-d, %Y"))?;
    out.push('\n');
    out.push_str(&render_summary(dashboard)?);
    out.push('\n');
    out.push_str("Habit journey\n");
    out.push_str(&render_calendar(&dashboard.habit_calendar)?);
    out.push('\n');
    out.push_str("Goal journey\n");
    out.push_str(&render_calendar(&dashboard.goal_calendar)?);
    Ok(out)
}

pub fn render_summary(dashboard: &Dashboard) -> Result<String, fmt::Error> {
    let habits = &dashboard.habit_overview;
    let goals = &dashboard.goal_summary;
    let mut out = String::new();
    writeln!(
        out,
        "Habits: {}/{} today ({}%) | best streak {} | average rate {}% | {} victories",
        habits.completed_today,
        habits.total,
        habits.today_percent,
        habits.best_streak,
        habits.average_completion_rate,
        habits.total_victories,
    )?;
    writeln!(
        out,
        "Goals: {} total | {} completed | {} in progress | average {}% | {} due soon",
        goals.total, goals.completed, goals.in_progress, goals.average_progress, goals.due_soon,
    )?;
    for recent in habits.recent.iter().chain(&dashboard.goal_overview.recent) {
        writeln!(out, "  {} on {}", recent.name, recent.day)?;
    }
    Ok(out)
}

/// Text heatmap: one row per weekday, one column per week, months separated by a gap.
pub fn render_calendar(segments: &[MonthSegment]) -> Result<String, fmt::Error> {
    let mut out = String::from("    ");
    for segment in segments {
        let width = segment.weeks.len();
        write!(out, "{:<width$} ", segment.label, width = width)?;
    }
    out.truncate(out.trim_end().len());
    out.push('\n');

    for (weekday, label) in WEEKDAY_LABELS.iter().enumerate() {
        out.push_str(label);
        out.push(' ');
        for segment in segments {
            for week in &segment.weeks {
                out.push(glyph(&week[weekday]));
            }
            out.push(' ');
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    Ok(out)
}

fn glyph(slot: &CalendarSlot) -> char {
    match slot.cell().map(|cell| cell.intensity_level) {
        None => ' ',
        Some(0) => '·',
        Some(1) => '░',
        Some(2) => '▒',
        Some(3) => '▓',
        Some(_) => '█',
    }
}
