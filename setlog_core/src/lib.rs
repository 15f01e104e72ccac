#![forbid(unsafe_code)]

//! Core domain model and business logic for the Setlog workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, workouts, sets)
//! - The active-session state engine
//! - Rest-timer countdown
//! - Exercise library filtering
//! - Catalog seeding and persistence

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod prefs;
pub mod seed;
pub mod library;
pub mod timer;
pub mod summary;
pub mod session;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use store::{JsonStore, MemoryStore, WorkoutStore};
pub use prefs::Prefs;
pub use seed::{default_catalog, seed_if_needed, SeedFlag};
pub use library::LibraryFilter;
pub use timer::{RestTimer, DEFAULT_REST_SECONDS};
pub use summary::{summarize, WorkoutSummary};
pub use session::{group_sets, ExerciseGroup, SessionEngine, DEFAULT_SET_COUNT};
pub use history::recent_workouts;
pub use export::export_history;
