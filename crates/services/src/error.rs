//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tutor_core::error::Error as DomainError;
use tutor_core::model::{LessonId, QuizError, SubjectId};

/// Errors emitted by `UserService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UserServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `LearningService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningServiceError {
    #[error("unknown lesson: {0}")]
    UnknownLesson(LessonId),
    #[error("unknown subject: {0}")]
    UnknownSubject(SubjectId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    User(#[from] UserServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    User(#[from] UserServiceError),
}
