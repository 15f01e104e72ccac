//! Active-session state engine.
//!
//! Owns the in-progress workout and its sets, keeps the ordering and
//! grouping invariants intact across mutations, and mirrors every change
//! into the store collaborator. Store save failures are absorbed: the
//! in-memory state stays authoritative for the rest of the session and the
//! next successful save reconciles it. The one exception is session start,
//! where a failed save is surfaced as a one-shot user-facing error.

use crate::store::WorkoutStore;
use crate::summary::{summarize, WorkoutSummary};
use crate::timer::{RestTimer, DEFAULT_REST_SECONDS};
use crate::{Exercise, Workout, WorkoutSet};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// Sets created per exercise when no count is given
pub const DEFAULT_SET_COUNT: u32 = 3;

/// An ordered run of sets sharing one exercise within the workout
#[derive(Clone, Debug)]
pub struct ExerciseGroup {
    pub exercise: Exercise,
    pub exercise_order: u32,
    /// Ascending by `set_order`
    pub sets: Vec<WorkoutSet>,
}

/// Partition sets into exercise groups.
///
/// Groups are ordered ascending by `exercise_order`, each internally sorted
/// by `set_order`. A group's exercise is the first resolvable exercise
/// reference among its members; groups with no resolvable exercise are
/// dropped (defensive, the grouping invariant should make this impossible).
pub fn group_sets(sets: &[WorkoutSet], exercises: &HashMap<Uuid, Exercise>) -> Vec<ExerciseGroup> {
    let mut by_order: BTreeMap<u32, Vec<&WorkoutSet>> = BTreeMap::new();
    for set in sets {
        by_order.entry(set.exercise_order).or_default().push(set);
    }

    by_order
        .into_iter()
        .filter_map(|(exercise_order, members)| {
            let exercise = members
                .iter()
                .filter_map(|s| s.exercise_id)
                .find_map(|id| exercises.get(&id))?
                .clone();

            let mut ordered: Vec<WorkoutSet> = members.into_iter().cloned().collect();
            ordered.sort_by_key(|s| s.set_order);

            Some(ExerciseGroup {
                exercise,
                exercise_order,
                sets: ordered,
            })
        })
        .collect()
}

/// Orchestrates one active workout session over a store collaborator.
pub struct SessionEngine<S: WorkoutStore> {
    store: S,
    workout: Option<Workout>,
    sets: Vec<WorkoutSet>,
    /// Exercises referenced by this session, for group resolution
    exercises: HashMap<Uuid, Exercise>,
    is_starting: bool,
    start_error: Option<String>,
    rest_timer: RestTimer,
    default_rest_seconds: u32,
}

impl<S: WorkoutStore> SessionEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            workout: None,
            sets: Vec::new(),
            exercises: HashMap::new(),
            is_starting: false,
            start_error: None,
            rest_timer: RestTimer::new(),
            default_rest_seconds: DEFAULT_REST_SECONDS,
        }
    }

    /// Override the rest duration used when a set completion starts the timer.
    pub fn with_default_rest_seconds(mut self, seconds: u32) -> Self {
        self.default_rest_seconds = seconds;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_workout(&self) -> Option<&Workout> {
        self.workout.as_ref()
    }

    pub fn is_starting(&self) -> bool {
        self.is_starting
    }

    /// One-shot user-facing message from a failed session start
    pub fn start_error(&self) -> Option<&str> {
        self.start_error.as_deref()
    }

    pub fn dismiss_start_error(&mut self) {
        self.start_error = None;
    }

    /// Start a session if none is active.
    ///
    /// The new workout is saved immediately so subsequent set inserts have
    /// a stable owning identity. On persistence failure the session stays
    /// unstarted and the error is recorded for the user to dismiss.
    pub fn start_session(&mut self) {
        if self.workout.is_some() {
            return;
        }

        self.is_starting = true;
        let new_workout = Workout::new(Utc::now());

        let persisted = self
            .store
            .insert_workout(&new_workout)
            .and_then(|_| self.store.save());

        match persisted {
            Ok(()) => {
                tracing::info!("Started workout {}", new_workout.id);
                self.workout = Some(new_workout);
            }
            Err(e) => {
                tracing::warn!("Failed to persist new workout: {}", e);
                self.start_error = Some("Failed to start workout.".into());
            }
        }

        self.is_starting = false;
    }

    /// Append a new exercise group with `max(1, default_set_count)` empty sets.
    ///
    /// Silent no-op when no session is active.
    pub fn add_exercise(&mut self, exercise: &Exercise, default_set_count: u32) {
        let Some(workout_id) = self.workout.as_ref().map(|w| w.id) else {
            tracing::debug!("add_exercise ignored: no active workout");
            return;
        };

        let next_exercise_order = self
            .sets
            .iter()
            .map(|s| s.exercise_order)
            .max()
            .map_or(0, |m| m + 1);

        self.exercises.insert(exercise.id, exercise.clone());
        // Custom exercises reach the store here; seeded ones become upserts
        if let Err(e) = self.store.insert_exercise(exercise) {
            tracing::warn!("Failed to stage exercise {}: {}", exercise.id, e);
        }

        for set_order in 0..default_set_count.max(1) {
            let set = WorkoutSet::new(exercise.id, workout_id, set_order, next_exercise_order);
            self.mirror_set(&set);
            self.sets.push(set);
        }

        self.persist();
    }

    /// Append one set to an existing exercise group.
    pub fn add_set(&mut self, group: &ExerciseGroup) {
        let Some(workout_id) = self.workout.as_ref().map(|w| w.id) else {
            tracing::debug!("add_set ignored: no active workout");
            return;
        };

        let next_set_order = self
            .sets
            .iter()
            .filter(|s| s.exercise_order == group.exercise_order)
            .map(|s| s.set_order)
            .max()
            .map_or(0, |m| m + 1);

        let set = WorkoutSet::new(
            group.exercise.id,
            workout_id,
            next_set_order,
            group.exercise_order,
        );
        self.mirror_set(&set);
        self.sets.push(set);

        self.persist();
    }

    /// Delete the sets at the given positions within an exercise group.
    ///
    /// Positions index the group's sets ordered by `set_order`; out-of-range
    /// positions are ignored. Survivors are renumbered to a contiguous
    /// zero-based sequence in their original relative order.
    pub fn delete_sets(&mut self, exercise_order: u32, positions: &[usize]) {
        if self.workout.is_none() {
            return;
        }

        let mut ordered: Vec<(u32, Uuid)> = self
            .sets
            .iter()
            .filter(|s| s.exercise_order == exercise_order)
            .map(|s| (s.set_order, s.id))
            .collect();
        ordered.sort_by_key(|(order, _)| *order);

        if ordered.is_empty() {
            return;
        }

        let doomed: BTreeSet<Uuid> = positions
            .iter()
            .filter(|&&p| p < ordered.len())
            .map(|&p| ordered[p].1)
            .collect();

        for id in &doomed {
            if let Err(e) = self.store.delete_set(*id) {
                tracing::warn!("Failed to delete set {}: {}", id, e);
            }
        }
        self.sets.retain(|s| !doomed.contains(&s.id));

        // Re-establish contiguous set_order over the survivors
        let mut survivors: Vec<&mut WorkoutSet> = self
            .sets
            .iter_mut()
            .filter(|s| s.exercise_order == exercise_order)
            .collect();
        survivors.sort_by_key(|s| s.set_order);
        let reindexed: Vec<WorkoutSet> = survivors
            .into_iter()
            .enumerate()
            .map(|(idx, set)| {
                set.set_order = idx as u32;
                set.clone()
            })
            .collect();
        for set in &reindexed {
            self.mirror_set(set);
        }

        self.persist();
    }

    /// Set or clear a set's completion, keeping `completed_at` in lockstep.
    ///
    /// Completing starts the rest timer sourced from this set; un-completing
    /// the set that sources the active timer cancels it.
    pub fn toggle_set_completion(&mut self, set_id: Uuid, is_completed: bool) {
        let Some(set) = self.sets.iter_mut().find(|s| s.id == set_id) else {
            return;
        };

        set.is_completed = is_completed;
        set.completed_at = is_completed.then(Utc::now);
        let snapshot = set.clone();
        self.mirror_set(&snapshot);
        self.persist();

        if is_completed {
            self.rest_timer.start(self.default_rest_seconds, Some(set_id));
        } else if self.rest_timer.source_set_id() == Some(set_id) {
            self.rest_timer.skip();
        }
    }

    /// Copy weight, reps and RPE from one set to another.
    ///
    /// Completion state and notes are never copied.
    pub fn copy_values(&mut self, source_id: Uuid, target_id: Uuid) {
        let Some(source) = self.sets.iter().find(|s| s.id == source_id) else {
            return;
        };
        let (weight, reps, rpe) = (source.weight, source.reps, source.rpe);

        let Some(target) = self.sets.iter_mut().find(|s| s.id == target_id) else {
            return;
        };
        target.weight = weight;
        target.reps = reps;
        target.rpe = rpe;

        let snapshot = target.clone();
        self.mirror_set(&snapshot);
        self.persist();
    }

    /// Edit a set's weight; out-of-range input leaves the value unchanged.
    pub fn update_set_weight(&mut self, set_id: Uuid, weight: Option<f64>) {
        self.edit_set(set_id, |s| s.update_weight(weight));
    }

    /// Edit a set's rep count; zero is rejected.
    pub fn update_set_reps(&mut self, set_id: Uuid, reps: Option<u32>) {
        self.edit_set(set_id, |s| s.update_reps(reps));
    }

    /// Edit a set's RPE; values outside 0–10 are rejected.
    pub fn update_set_rpe(&mut self, set_id: Uuid, rpe: Option<f64>) {
        self.edit_set(set_id, |s| s.update_rpe(rpe));
    }

    fn edit_set<F>(&mut self, set_id: Uuid, apply: F)
    where
        F: FnOnce(&mut WorkoutSet) -> bool,
    {
        let Some(set) = self.sets.iter_mut().find(|s| s.id == set_id) else {
            return;
        };
        if !apply(set) {
            return;
        }
        let snapshot = set.clone();
        self.mirror_set(&snapshot);
        self.persist();
    }

    /// Current sets partitioned into ordered exercise groups.
    pub fn grouped_sets(&self) -> Vec<ExerciseGroup> {
        if self.workout.is_none() {
            return Vec::new();
        }
        group_sets(&self.sets, &self.exercises)
    }

    /// Summary statistics for the active workout.
    pub fn summary(&self) -> Option<WorkoutSummary> {
        let workout = self.workout.as_ref()?;
        Some(summarize(workout, &self.sets))
    }

    /// End the session: stamp completion, cache the duration, persist, and
    /// return the final summary. The engine is ready for a new session
    /// afterwards.
    pub fn finish_session(&mut self) -> Option<WorkoutSummary> {
        let mut workout = self.workout.take()?;
        let now = Utc::now();
        workout.completed_at = Some(now);
        workout.duration_seconds = Some((now - workout.started_at).num_seconds().max(0) as u32);

        if let Err(e) = self.store.insert_workout(&workout) {
            tracing::warn!("Failed to record finished workout: {}", e);
        }
        self.persist();
        self.rest_timer.skip();

        let summary = summarize(&workout, &self.sets);
        tracing::info!(
            "Finished workout {}: {} completed sets",
            workout.id,
            summary.completed_set_count
        );

        self.sets.clear();
        self.exercises.clear();
        Some(summary)
    }

    // ------------------------------------------------------------------
    // Rest timer facade
    // ------------------------------------------------------------------

    /// Start the rest timer; `None` uses the configured default duration.
    pub fn start_rest_timer(&mut self, duration_seconds: Option<u32>, source_set_id: Option<Uuid>) {
        let duration = duration_seconds.unwrap_or(self.default_rest_seconds);
        self.rest_timer.start(duration, source_set_id);
    }

    pub fn adjust_rest_timer(&mut self, delta_seconds: i64) {
        self.rest_timer.adjust(delta_seconds);
    }

    pub fn skip_rest_timer(&mut self) {
        self.rest_timer.skip();
    }

    pub fn rest_remaining_seconds(&self) -> Option<u32> {
        self.rest_timer.remaining_seconds()
    }

    pub fn rest_timer_active(&self) -> bool {
        self.rest_timer.is_active()
    }

    // ------------------------------------------------------------------
    // Persistence plumbing
    // ------------------------------------------------------------------

    fn mirror_set(&mut self, set: &WorkoutSet) {
        if let Err(e) = self.store.insert_set(set) {
            tracing::warn!("Failed to stage set {}: {}", set.id, e);
        }
    }

    /// Best-effort save: failures are logged and absorbed, the in-memory
    /// state remains authoritative until the next successful save.
    fn persist(&mut self) {
        if let Err(e) = self.store.save() {
            tracing::warn!("Save failed, keeping in-memory state: {}", e);
        }
    }
}
