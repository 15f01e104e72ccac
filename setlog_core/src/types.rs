//! Core domain types for the workout log.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise definitions and their category/equipment enums
//! - Workouts and the sets logged within them
//! - Ordering fields that keep an active session's groups contiguous

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Body-area category an exercise targets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Legs,
    Glutes,
    Core,
    Cardio,
    Other,
}

impl ExerciseCategory {
    /// Canonical display ordering for category buckets
    pub const ALL: [ExerciseCategory; 10] = [
        ExerciseCategory::Chest,
        ExerciseCategory::Back,
        ExerciseCategory::Shoulders,
        ExerciseCategory::Biceps,
        ExerciseCategory::Triceps,
        ExerciseCategory::Legs,
        ExerciseCategory::Glutes,
        ExerciseCategory::Core,
        ExerciseCategory::Cardio,
        ExerciseCategory::Other,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseCategory::Chest => "Chest",
            ExerciseCategory::Back => "Back",
            ExerciseCategory::Shoulders => "Shoulders",
            ExerciseCategory::Biceps => "Biceps",
            ExerciseCategory::Triceps => "Triceps",
            ExerciseCategory::Legs => "Legs",
            ExerciseCategory::Glutes => "Glutes",
            ExerciseCategory::Core => "Core",
            ExerciseCategory::Cardio => "Cardio",
            ExerciseCategory::Other => "Other",
        }
    }
}

/// Equipment an exercise is performed with
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Machine,
    Cable,
    Bodyweight,
    Kettlebell,
    Band,
    Other,
}

impl Equipment {
    pub fn display_name(&self) -> &'static str {
        match self {
            Equipment::Barbell => "Barbell",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::Machine => "Machine",
            Equipment::Cable => "Cable",
            Equipment::Bodyweight => "Bodyweight",
            Equipment::Kettlebell => "Kettlebell",
            Equipment::Band => "Band",
            Equipment::Other => "Other",
        }
    }
}

/// An exercise definition (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
    pub is_custom: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, category: ExerciseCategory, equipment: Equipment) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            equipment,
            is_custom: false,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Workout and Set Types
// ============================================================================

/// One workout session with a start time and optional completion time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub notes: Option<String>,
    /// Cached duration; when absent, duration is derived from the timestamps
    pub duration_seconds: Option<u32>,
    pub template_id: Option<Uuid>,
}

impl Workout {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            completed_at: None,
            name: None,
            notes: None,
            duration_seconds: None,
            template_id: None,
        }
    }
}

/// One logged attempt at an exercise within a workout.
///
/// Back-references to the owning workout and exercise are optional ids to
/// tolerate orphaning; the engine only creates sets with both present.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub exercise_id: Option<Uuid>,
    pub workout_id: Option<Uuid>,

    // Ordering
    /// Zero-based position within the exercise group
    pub set_order: u32,
    /// Zero-based position of the exercise group within the workout
    pub exercise_order: u32,

    // Metrics
    pub weight: Option<f64>,
    pub reps: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub rpe: Option<f64>,

    // State
    pub is_warmup: bool,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,
}

impl WorkoutSet {
    pub fn new(exercise_id: Uuid, workout_id: Uuid, set_order: u32, exercise_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id: Some(exercise_id),
            workout_id: Some(workout_id),
            set_order,
            exercise_order,
            weight: None,
            reps: None,
            duration_seconds: None,
            rpe: None,
            is_warmup: false,
            is_completed: false,
            completed_at: None,
            notes: None,
        }
    }

    /// Update the weight, rejecting negative values.
    ///
    /// Returns true if the value was accepted. Rejected input leaves the
    /// prior value unchanged.
    pub fn update_weight(&mut self, weight: Option<f64>) -> bool {
        match weight {
            Some(w) if !(w >= 0.0) => {
                tracing::debug!("Rejected weight {w}: must be non-negative");
                false
            }
            other => {
                self.weight = other;
                true
            }
        }
    }

    /// Update the rep count, rejecting zero.
    pub fn update_reps(&mut self, reps: Option<u32>) -> bool {
        match reps {
            Some(0) => {
                tracing::debug!("Rejected reps 0: must be positive");
                false
            }
            other => {
                self.reps = other;
                true
            }
        }
    }

    /// Update the RPE, rejecting values outside 0.0–10.0.
    pub fn update_rpe(&mut self, rpe: Option<f64>) -> bool {
        match rpe {
            Some(r) if !(0.0..=10.0).contains(&r) => {
                tracing::debug!("Rejected RPE {r}: must be within 0-10");
                false
            }
            other => {
                self.rpe = other;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> WorkoutSet {
        WorkoutSet::new(Uuid::new_v4(), Uuid::new_v4(), 0, 0)
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut set = sample_set();
        assert!(set.update_weight(Some(135.0)));
        assert!(!set.update_weight(Some(-5.0)));
        assert_eq!(set.weight, Some(135.0));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let mut set = sample_set();
        assert!(!set.update_weight(Some(f64::NAN)));
        assert_eq!(set.weight, None);
    }

    #[test]
    fn test_zero_reps_rejected() {
        let mut set = sample_set();
        assert!(set.update_reps(Some(8)));
        assert!(!set.update_reps(Some(0)));
        assert_eq!(set.reps, Some(8));
    }

    #[test]
    fn test_rpe_range() {
        let mut set = sample_set();
        assert!(set.update_rpe(Some(0.0)));
        assert!(set.update_rpe(Some(10.0)));
        assert!(!set.update_rpe(Some(10.5)));
        assert!(!set.update_rpe(Some(-1.0)));
        assert_eq!(set.rpe, Some(10.0));
    }

    #[test]
    fn test_clearing_values_allowed() {
        let mut set = sample_set();
        set.update_weight(Some(60.0));
        assert!(set.update_weight(None));
        assert_eq!(set.weight, None);
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&ExerciseCategory::Shoulders).unwrap();
        assert_eq!(json, "\"shoulders\"");
        let back: ExerciseCategory = serde_json::from_str("\"cardio\"").unwrap();
        assert_eq!(back, ExerciseCategory::Cardio);
    }
}
