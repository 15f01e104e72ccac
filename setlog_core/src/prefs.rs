//! Lightweight key-value preference store.
//!
//! Holds the few persistent flags that live outside the main record store,
//! currently just the catalog-seeding marker. Saved atomically with file
//! locking, the same pattern as the record store document.

use crate::seed::SeedFlag;
use crate::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PrefsData {
    #[serde(default)]
    has_seeded_default_exercises: bool,
}

/// Preference store bound to a file path
pub struct Prefs {
    path: PathBuf,
    data: PrefsData,
}

impl Prefs {
    /// Open preferences at `path`; missing or corrupted files fall back to
    /// defaults with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = Self::load_data(&path);
        Ok(Self { path, data })
    }

    fn load_data(path: &Path) -> PrefsData {
        if !path.exists() {
            return PrefsData::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open prefs {:?}: {}. Using defaults.", path, e);
                return PrefsData::default();
            }
        };

        if file.lock_shared().is_err() {
            return PrefsData::default();
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        let _ = file.unlock();
        if read.is_err() {
            return PrefsData::default();
        }

        match serde_json::from_str(&contents) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to parse prefs {:?}: {}. Using defaults.", path, e);
                PrefsData::default()
            }
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "prefs path missing parent")
        })?)?;

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
        Ok(())
    }
}

impl SeedFlag for Prefs {
    fn is_set(&self) -> bool {
        self.data.has_seeded_default_exercises
    }

    fn mark_set(&mut self) -> Result<()> {
        self.data.has_seeded_default_exercises = true;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_defaults_unset() {
        let temp_dir = tempfile::tempdir().unwrap();
        let prefs = Prefs::open(temp_dir.path().join("prefs.json")).unwrap();
        assert!(!prefs.is_set());
    }

    #[test]
    fn test_flag_persists_across_opens() {
        let temp_dir = tempfile::tempdir().unwrap();
        let prefs_path = temp_dir.path().join("prefs.json");

        let mut prefs = Prefs::open(&prefs_path).unwrap();
        prefs.mark_set().unwrap();

        let reopened = Prefs::open(&prefs_path).unwrap();
        assert!(reopened.is_set());
    }

    #[test]
    fn test_corrupted_prefs_fall_back_to_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let prefs_path = temp_dir.path().join("prefs.json");
        std::fs::write(&prefs_path, "not json").unwrap();

        let prefs = Prefs::open(&prefs_path).unwrap();
        assert!(!prefs.is_set());
    }
}
