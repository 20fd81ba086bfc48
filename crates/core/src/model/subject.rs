use serde::{Deserialize, Serialize};

use crate::model::ids::SubjectId;

/// A top-level course area that groups lessons.
///
/// `completed_lessons` is derived data: it is only ever set by
/// [`crate::progress::with_progress`] from a user snapshot and the lesson
/// catalog, never edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub gradient: String,
    /// Declared size of the course.
    pub total_lessons: u32,
    #[serde(default)]
    pub completed_lessons: u32,
}

impl Subject {
    /// Share of the declared course the user has completed, in percent.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        f64::from(self.completed_lessons) / f64::from(self.total_lessons) * 100.0
    }
}
