//! CSV export of workout history.
//!
//! Appends one summary row per workout with headers written on file
//! creation and an fsync before returning, so a crash never leaves a
//! half-written export behind the caller's back.

use crate::store::WorkoutStore;
use crate::summary::summarize;
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    started_at: String,
    completed_at: Option<String>,
    duration_seconds: u32,
    completed_sets: usize,
    logged_volume: f64,
}

/// Export every stored workout as summary rows appended to `csv_path`.
///
/// Returns the number of workouts written.
pub fn export_history<S: WorkoutStore>(store: &S, csv_path: &Path) -> Result<usize> {
    let workouts = store.workouts()?;
    if workouts.is_empty() {
        tracing::info!("No workouts to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for workout in &workouts {
        let sets = store.sets_for_workout(workout.id)?;
        let summary = summarize(workout, &sets);
        writer.serialize(CsvRow {
            id: workout.id.to_string(),
            started_at: workout.started_at.to_rfc3339(),
            completed_at: workout.completed_at.map(|t| t.to_rfc3339()),
            duration_seconds: summary.duration_seconds,
            completed_sets: summary.completed_set_count,
            logged_volume: summary.logged_volume,
        })?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} workouts to {:?}", workouts.len(), csv_path);
    Ok(workouts.len())
}
