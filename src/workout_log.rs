use chrono::{DateTime, Datelike, Local, NaiveDate};
use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One completed workout day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub duration: String,
    pub timestamp: DateTime<Local>,
}

/// Completion history keyed by calendar day.
///
/// Only the data and its aggregates live here; the calendar view itself is
/// out of scope. The program timer records the day when a run completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutLog {
    days: BTreeMap<NaiveDate, WorkoutEntry>,
}

impl WorkoutLog {
    pub fn record(&mut self, date: NaiveDate, duration: impl Into<String>) {
        self.days.insert(
            date,
            WorkoutEntry {
                duration: duration.into(),
                timestamp: Local::now(),
            },
        );
    }

    pub fn remove(&mut self, date: NaiveDate) {
        self.days.remove(&date);
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&WorkoutEntry> {
        self.days.get(&date)
    }

    pub fn is_workout_day(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn total_workouts(&self) -> usize {
        self.days.len()
    }

    pub fn workouts_in_month(&self, year: i32, month: u32) -> usize {
        self.days
            .keys()
            .filter(|d| d.year() == year && d.month() == month)
            .count()
    }

    /// Consecutive workout days ending today (or yesterday, so an unfinished
    /// today does not zero the streak).
    pub fn current_streak(&self, today: NaiveDate) -> usize {
        let mut day = if self.is_workout_day(today) {
            today
        } else {
            today.pred_opt().unwrap_or(today)
        };
        let mut streak = 0;
        while self.is_workout_day(day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    /// Longest run of consecutive workout days anywhere in the history.
    pub fn longest_streak(&self) -> usize {
        if self.days.is_empty() {
            return 0;
        }
        let mut longest = 1;
        let mut run = 1;
        for (a, b) in self.days.keys().tuple_windows() {
            if b.signed_duration_since(*a).num_days() == 1 {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 1;
            }
        }
        longest
    }
}

pub trait WorkoutStore {
    fn load(&self) -> WorkoutLog;
    fn save(&self, log: &WorkoutLog) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileWorkoutStore {
    path: PathBuf,
}

impl FileWorkoutStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "kondi") {
            pd.data_local_dir().join("workouts.json")
        } else {
            PathBuf::from("kondi_workouts.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl WorkoutStore for FileWorkoutStore {
    fn load(&self) -> WorkoutLog {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(log) = serde_json::from_slice::<WorkoutLog>(&bytes) {
                return log;
            }
        }
        WorkoutLog::default()
    }

    fn save(&self, log: &WorkoutLog) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(log).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
