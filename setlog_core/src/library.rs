//! Search and category filtering over the exercise library.
//!
//! Pure per-call filtering: the filter holds the search text and selected
//! category, and derives results from whatever exercise collection it is
//! handed. Used both for browsing and for the add-exercise picker.

use crate::{Exercise, ExerciseCategory};

/// Held search/category filter state
#[derive(Clone, Debug, Default)]
pub struct LibraryFilter {
    pub search_text: String,
    /// `None` = all categories
    pub selected_category: Option<ExerciseCategory>,
}

impl LibraryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exercises matching both the category filter and the search text.
    pub fn filtered<'a>(&self, exercises: &'a [Exercise]) -> Vec<&'a Exercise> {
        exercises
            .iter()
            .filter(|e| self.matches_category(e) && self.matches_search(e))
            .collect()
    }

    /// Filtered exercises bucketed by category.
    ///
    /// Buckets follow the canonical category ordering, empty buckets are
    /// dropped, and names sort alphabetically ignoring case.
    pub fn grouped_by_category<'a>(
        &self,
        exercises: &'a [Exercise],
    ) -> Vec<(ExerciseCategory, Vec<&'a Exercise>)> {
        let filtered = self.filtered(exercises);

        ExerciseCategory::ALL
            .iter()
            .filter_map(|category| {
                let mut bucket: Vec<&Exercise> = filtered
                    .iter()
                    .copied()
                    .filter(|e| e.category == *category)
                    .collect();
                if bucket.is_empty() {
                    return None;
                }
                bucket.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                Some((*category, bucket))
            })
            .collect()
    }

    fn matches_category(&self, exercise: &Exercise) -> bool {
        match self.selected_category {
            Some(category) => exercise.category == category,
            None => true,
        }
    }

    fn matches_search(&self, exercise: &Exercise) -> bool {
        let trimmed = self.search_text.trim();
        if trimmed.is_empty() {
            return true;
        }
        exercise
            .name
            .to_lowercase()
            .contains(&trimmed.to_lowercase())
    }
}
