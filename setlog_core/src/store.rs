//! Record store collaborator for the session engine.
//!
//! The engine never implements persistence itself; it talks to a
//! [`WorkoutStore`] and ends every mutating command with an explicit
//! `save()`. Two implementations are provided: a JSON-document store with
//! file locking and atomic replacement, and an in-memory store for tests
//! and dry runs.

use crate::{Error, Exercise, Result, Workout, WorkoutSet};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Transactional-ish object store over the three record types.
///
/// Inserts are upserts keyed by record id; mutations become visible to
/// other processes only after `save()`.
pub trait WorkoutStore {
    fn insert_exercise(&mut self, exercise: &Exercise) -> Result<()>;
    /// Delete an exercise, cascading to every set that references it.
    fn delete_exercise(&mut self, id: Uuid) -> Result<()>;
    fn insert_workout(&mut self, workout: &Workout) -> Result<()>;
    fn insert_set(&mut self, set: &WorkoutSet) -> Result<()>;
    fn delete_set(&mut self, id: Uuid) -> Result<()>;

    /// Flush pending mutations to durable storage.
    fn save(&mut self) -> Result<()>;

    fn exercise_count(&self) -> Result<usize>;
    fn exercises(&self) -> Result<Vec<Exercise>>;
    fn workouts(&self) -> Result<Vec<Workout>>;
    fn sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>>;
}

/// On-disk document holding the flat record tables
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    exercises: Vec<Exercise>,
    #[serde(default)]
    workouts: Vec<Workout>,
    #[serde(default)]
    sets: Vec<WorkoutSet>,
}

/// JSON-document store with file locking and atomic replacement
pub struct JsonStore {
    path: PathBuf,
    data: StoreData,
}

impl JsonStore {
    /// Open the store at `path`, loading existing records with a shared lock.
    ///
    /// A missing file yields an empty store. A corrupted file logs a warning
    /// and yields an empty store rather than refusing to start.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = Self::load_data(&path)?;
        Ok(Self { path, data })
    }

    fn load_data(path: &Path) -> Result<StoreData> {
        if !path.exists() {
            tracing::info!("No store file found at {:?}, starting empty", path);
            return Ok(StoreData::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open store file {:?}: {}. Starting empty.", path, e);
                return Ok(StoreData::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock store file {:?}: {}. Starting empty.", path, e);
            return Ok(StoreData::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read store file {:?}: {}. Starting empty.", path, e);
            return Ok(StoreData::default());
        }

        file.unlock()?;

        match serde_json::from_str::<StoreData>(&contents) {
            Ok(data) => {
                tracing::debug!(
                    "Loaded store from {:?}: {} exercises, {} workouts, {} sets",
                    path,
                    data.exercises.len(),
                    data.workouts.len(),
                    data.sets.len()
                );
                Ok(data)
            }
            Err(e) => {
                tracing::warn!("Failed to parse store file {:?}: {}. Starting empty.", path, e);
                Ok(StoreData::default())
            }
        }
    }
}

fn upsert_by_id<T, F>(records: &mut Vec<T>, record: T, id_of: F)
where
    T: Clone,
    F: Fn(&T) -> Uuid,
{
    let id = id_of(&record);
    if let Some(existing) = records.iter_mut().find(|r| id_of(r) == id) {
        *existing = record;
    } else {
        records.push(record);
    }
}

impl WorkoutStore for JsonStore {
    fn insert_exercise(&mut self, exercise: &Exercise) -> Result<()> {
        upsert_by_id(&mut self.data.exercises, exercise.clone(), |e| e.id);
        Ok(())
    }

    fn delete_exercise(&mut self, id: Uuid) -> Result<()> {
        self.data.exercises.retain(|e| e.id != id);
        // Cascade: drop every set that referenced this exercise
        self.data.sets.retain(|s| s.exercise_id != Some(id));
        Ok(())
    }

    fn insert_workout(&mut self, workout: &Workout) -> Result<()> {
        upsert_by_id(&mut self.data.workouts, workout.clone(), |w| w.id);
        Ok(())
    }

    fn insert_set(&mut self, set: &WorkoutSet) -> Result<()> {
        upsert_by_id(&mut self.data.sets, set.clone(), |s| s.id);
        Ok(())
    }

    fn delete_set(&mut self, id: Uuid) -> Result<()> {
        self.data.sets.retain(|s| s.id != id);
        Ok(())
    }

    /// Atomically write the store document:
    /// 1. Write to a temp file in the same directory
    /// 2. Sync to disk
    /// 3. Rename over the original
    fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(&self.data)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved store to {:?}", self.path);
        Ok(())
    }

    fn exercise_count(&self) -> Result<usize> {
        Ok(self.data.exercises.len())
    }

    fn exercises(&self) -> Result<Vec<Exercise>> {
        Ok(self.data.exercises.clone())
    }

    fn workouts(&self) -> Result<Vec<Workout>> {
        Ok(self.data.workouts.clone())
    }

    fn sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>> {
        Ok(self
            .data
            .sets
            .iter()
            .filter(|s| s.workout_id == Some(workout_id))
            .cloned()
            .collect())
    }
}

/// In-memory store for tests and dry runs; `save()` is a no-op flush
#[derive(Default)]
pub struct MemoryStore {
    data: StoreData,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save()` has been called
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl WorkoutStore for MemoryStore {
    fn insert_exercise(&mut self, exercise: &Exercise) -> Result<()> {
        upsert_by_id(&mut self.data.exercises, exercise.clone(), |e| e.id);
        Ok(())
    }

    fn delete_exercise(&mut self, id: Uuid) -> Result<()> {
        self.data.exercises.retain(|e| e.id != id);
        self.data.sets.retain(|s| s.exercise_id != Some(id));
        Ok(())
    }

    fn insert_workout(&mut self, workout: &Workout) -> Result<()> {
        upsert_by_id(&mut self.data.workouts, workout.clone(), |w| w.id);
        Ok(())
    }

    fn insert_set(&mut self, set: &WorkoutSet) -> Result<()> {
        upsert_by_id(&mut self.data.sets, set.clone(), |s| s.id);
        Ok(())
    }

    fn delete_set(&mut self, id: Uuid) -> Result<()> {
        self.data.sets.retain(|s| s.id != id);
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.save_count += 1;
        Ok(())
    }

    fn exercise_count(&self) -> Result<usize> {
        Ok(self.data.exercises.len())
    }

    fn exercises(&self) -> Result<Vec<Exercise>> {
        Ok(self.data.exercises.clone())
    }

    fn workouts(&self) -> Result<Vec<Workout>> {
        Ok(self.data.workouts.clone())
    }

    fn sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<WorkoutSet>> {
        Ok(self
            .data
            .sets
            .iter()
            .filter(|s| s.workout_id == Some(workout_id))
            .cloned()
            .collect())
    }
}
