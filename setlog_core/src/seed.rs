//! One-time seeding of the exercise catalog.
//!
//! The bundled catalog ships inside the binary; a malformed bundle is a
//! packaging defect and panics on first access rather than surfacing as a
//! recoverable runtime error. Seeding itself is idempotent: a persisted
//! flag records completion, and a non-empty store is treated as already
//! seeded even if the flag was lost.

use crate::store::WorkoutStore;
use crate::{Equipment, Error, Exercise, ExerciseCategory, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use serde::Deserialize;

/// One entry of the bundled catalog resource
#[derive(Clone, Debug, Deserialize)]
pub struct SeedExercise {
    pub name: String,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
}

/// Decoded bundled catalog, parsed once and reused
static DEFAULT_CATALOG: Lazy<Vec<SeedExercise>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../assets/default_exercises.json"))
        .expect("bundled default_exercises.json is missing or malformed")
});

/// The decoded bundled exercise catalog.
pub fn default_catalog() -> &'static [SeedExercise] {
    &DEFAULT_CATALOG
}

/// Persisted record of whether default seeding has completed.
///
/// Injected rather than read from a process-wide global so tests can
/// substitute a fresh, isolated instance per run.
pub trait SeedFlag {
    fn is_set(&self) -> bool;
    fn mark_set(&mut self) -> Result<()>;
}

/// Seed the catalog if this installation has not been seeded yet.
///
/// Policy, checked in order:
/// 1. Flag already set: skip.
/// 2. Store already holds exercises (older flag key, or user-entered
///    customs): set the flag and skip, so a lost flag never duplicates data.
/// 3. Otherwise insert every bundled entry as a non-custom exercise,
///    persist once as a batch, and set the flag only after the persist
///    succeeds. No partial catalog is committed.
///
/// Returns the number of exercises inserted.
pub fn seed_if_needed<S, F>(store: &mut S, flag: &mut F) -> Result<usize>
where
    S: WorkoutStore,
    F: SeedFlag,
{
    if flag.is_set() {
        tracing::debug!("Catalog already seeded, skipping");
        return Ok(0);
    }

    let existing = store.exercise_count()?;
    if existing > 0 {
        tracing::info!("Store already holds {} exercises, marking as seeded", existing);
        flag.mark_set()?;
        return Ok(0);
    }

    let entries = default_catalog();
    let now = Utc::now();

    for entry in entries {
        let exercise = Exercise {
            id: uuid::Uuid::new_v4(),
            name: entry.name.clone(),
            category: entry.category,
            equipment: entry.equipment,
            is_custom: false,
            notes: None,
            created_at: now,
        };
        store.insert_exercise(&exercise)?;
    }

    store
        .save()
        .map_err(|e| Error::Seed(format!("failed to persist seeded catalog: {e}")))?;
    flag.mark_set()?;

    tracing::info!("Seeded {} default exercises", entries.len());
    Ok(entries.len())
}
