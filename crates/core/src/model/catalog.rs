use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{LessonId, SubjectId};
use crate::model::lesson::{Lesson, QuizError};
use crate::model::subject::Subject;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate subject id: {0}")]
    DuplicateSubject(SubjectId),

    #[error("duplicate lesson id: {0}")]
    DuplicateLesson(LessonId),

    #[error("lesson {lesson} references unknown subject {subject}")]
    UnknownSubject { lesson: LessonId, subject: SubjectId },

    #[error("lesson {lesson} lists unknown prerequisite {prerequisite}")]
    UnknownPrerequisite {
        lesson: LessonId,
        prerequisite: LessonId,
    },

    #[error("invalid quiz in lesson {lesson}: {source}")]
    InvalidQuiz {
        lesson: LessonId,
        #[source]
        source: QuizError,
    },
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Immutable reference data: every subject and lesson the learner can see.
///
/// Order is significant. Subjects and lessons keep the order they were
/// supplied in, and every rule that breaks ties does so by that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    subjects: Vec<Subject>,
    lessons: Vec<Lesson>,
}

impl Catalog {
    /// Validates and assembles a catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on duplicate ids, dangling subject or
    /// prerequisite references, or a structurally invalid quiz.
    pub fn new(subjects: Vec<Subject>, lessons: Vec<Lesson>) -> Result<Self, CatalogError> {
        let mut subject_ids = HashSet::with_capacity(subjects.len());
        for subject in &subjects {
            if !subject_ids.insert(&subject.id) {
                return Err(CatalogError::DuplicateSubject(subject.id.clone()));
            }
        }

        let mut lesson_ids = HashSet::with_capacity(lessons.len());
        for lesson in &lessons {
            if !lesson_ids.insert(&lesson.id) {
                return Err(CatalogError::DuplicateLesson(lesson.id.clone()));
            }
            if !subject_ids.contains(&lesson.subject_id) {
                return Err(CatalogError::UnknownSubject {
                    lesson: lesson.id.clone(),
                    subject: lesson.subject_id.clone(),
                });
            }
            lesson
                .quiz
                .validate()
                .map_err(|source| CatalogError::InvalidQuiz {
                    lesson: lesson.id.clone(),
                    source,
                })?;
        }

        for lesson in &lessons {
            if let Some(missing) = lesson
                .prerequisites
                .iter()
                .find(|p| !lesson_ids.contains(p))
            {
                return Err(CatalogError::UnknownPrerequisite {
                    lesson: lesson.id.clone(),
                    prerequisite: missing.clone(),
                });
            }
        }

        Ok(Self { subjects, lessons })
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| &l.id == id)
    }

    /// Lessons belonging to `subject_id`, in catalog order.
    pub fn lessons_for<'a>(&'a self, subject_id: &'a SubjectId) -> impl Iterator<Item = &'a Lesson> + 'a {
        self.lessons.iter().filter(move |l| &l.subject_id == subject_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
