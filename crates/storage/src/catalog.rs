use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tutor_core::model::{Catalog, CatalogError, Lesson, Subject};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogSourceError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] CatalogError),
}

/// On-disk catalog layout: `{ "subjects": [...], "lessons": [...] }`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    subjects: Vec<Subject>,
    #[serde(default)]
    lessons: Vec<Lesson>,
}

fn parse_catalog(json: &str) -> Result<Catalog, CatalogSourceError> {
    let file: CatalogFile = serde_json::from_str(json)?;
    tracing::debug!(
        subjects = file.subjects.len(),
        lessons = file.lessons.len(),
        "parsed catalog"
    );
    Ok(Catalog::new(file.subjects, file.lessons)?)
}

/// The catalog shipped with the binary.
///
/// # Errors
///
/// Returns `CatalogSourceError` if the bundled JSON is malformed or fails
/// catalog validation.
pub fn builtin_catalog() -> Result<Catalog, CatalogSourceError> {
    parse_catalog(BUILTIN_CATALOG)
}

/// Load and validate a catalog from a JSON file.
///
/// # Errors
///
/// Returns `CatalogSourceError` if the file cannot be read, is not valid
/// JSON, or describes an inconsistent catalog.
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<Catalog, CatalogSourceError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    tracing::info!(path = %path.display(), "loading catalog file");
    parse_catalog(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::model::{LessonId, SubjectId};

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin_catalog().unwrap();

        let ids: Vec<_> = catalog.subjects().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["calculus", "programming", "statistics", "physics"]);

        let calculus = SubjectId::new("calculus");
        assert_eq!(catalog.lessons_for(&calculus).count(), 2);
        assert!(catalog.lesson(&LessonId::new("prog-1")).is_some());
    }

    #[test]
    fn builtin_lessons_have_gradable_quizzes() {
        let catalog = builtin_catalog().unwrap();
        for lesson in catalog.lessons() {
            assert!(lesson.quiz.validate().is_ok(), "{}", lesson.id);
        }
    }

    #[test]
    fn missing_lessons_key_means_no_lessons() {
        let json = r#"{ "subjects": [] }"#;
        let catalog = parse_catalog(json).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn lesson_for_unknown_subject_is_rejected() {
        let json = r#"{
            "subjects": [],
            "lessons": [{
                "id": "x-1",
                "subjectId": "nowhere",
                "title": "Orphan",
                "description": "",
                "difficulty": "beginner",
                "duration": 5,
                "steps": [],
                "quiz": { "id": "quiz-x", "questions": [{
                    "id": "q1",
                    "question": "?",
                    "options": ["a", "b"],
                    "correctAnswer": 0,
                    "explanation": ""
                }]}
            }]
        }"#;

        let err = parse_catalog(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogSourceError::Invalid(CatalogError::UnknownSubject { .. })
        ));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            parse_catalog("not json"),
            Err(CatalogSourceError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_catalog_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogSourceError::Io(_)));
    }
}
