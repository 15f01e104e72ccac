//! Derived summary statistics for a workout.
//!
//! All values are recomputed on read from the domain records; nothing here
//! mutates state or caches results.

use crate::{Workout, WorkoutSet};
use chrono::{DateTime, Utc};

/// Display-ready facts about one workout
#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutSummary {
    pub completed_set_count: usize,
    /// Σ(weight × reps) across completed loaded sets
    pub logged_volume: f64,
    pub duration_seconds: u32,
    /// Freshness indicator: the latest of any set completion, the workout
    /// completion, or the workout start
    pub last_updated_at: DateTime<Utc>,
}

/// Summarize a workout from its owned sets.
pub fn summarize(workout: &Workout, sets: &[WorkoutSet]) -> WorkoutSummary {
    let completed_set_count = sets.iter().filter(|s| s.is_completed).count();

    let logged_volume = sets
        .iter()
        .filter(|s| s.is_completed)
        .filter_map(|s| match (s.weight, s.reps) {
            (Some(weight), Some(reps)) if reps > 0 => Some(weight * f64::from(reps)),
            _ => None,
        })
        .sum();

    let duration_seconds = match workout.duration_seconds {
        Some(cached) => cached,
        None => {
            let end = workout.completed_at.unwrap_or_else(Utc::now);
            (end - workout.started_at).num_seconds().max(0) as u32
        }
    };

    let last_updated_at = sets
        .iter()
        .filter_map(|s| s.completed_at)
        .chain(workout.completed_at)
        .chain(std::iter::once(workout.started_at))
        .max()
        .unwrap_or(workout.started_at);

    WorkoutSummary {
        completed_set_count,
        logged_volume,
        duration_seconds,
        last_updated_at,
    }
}
