//! Workout history loading.
//!
//! Reads past workouts from the store, pairs each with its derived
//! summary, and orders them newest first for display.

use crate::store::WorkoutStore;
use crate::summary::{summarize, WorkoutSummary};
use crate::{Result, Workout};
use chrono::{Duration, Utc};

/// Load workouts started within the last `days` days, newest first.
pub fn recent_workouts<S: WorkoutStore>(
    store: &S,
    days: i64,
) -> Result<Vec<(Workout, WorkoutSummary)>> {
    let cutoff = Utc::now() - Duration::days(days);

    let mut entries: Vec<(Workout, WorkoutSummary)> = Vec::new();
    for workout in store.workouts()? {
        if workout.started_at < cutoff {
            continue;
        }
        let sets = store.sets_for_workout(workout.id)?;
        let summary = summarize(&workout, &sets);
        entries.push((workout, summary));
    }

    entries.sort_by(|a, b| b.0.started_at.cmp(&a.0.started_at));

    tracing::debug!("Loaded {} workouts from last {} days", entries.len(), days);
    Ok(entries)
}
