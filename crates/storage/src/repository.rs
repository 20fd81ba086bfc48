use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::model::{LessonId, QuizScore, User, UserId, UserSnapshot};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a user.
///
/// This is the blob written to the key-value store. It mirrors the domain
/// `User` with plain types so the on-disk format does not depend on domain
/// newtypes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub streak: u32,
    pub total_points: u64,
    pub completed_lessons: Vec<String>,
    pub quiz_scores: BTreeMap<String, u32>,
}

impl UserRecord {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_owned(),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            avatar: user.avatar().map(str::to_owned),
            joined_at: user.joined_at(),
            streak: user.streak(),
            total_points: user.total_points(),
            completed_lessons: user
                .completed_lessons()
                .iter()
                .map(|id| id.as_str().to_owned())
                .collect(),
            quiz_scores: user
                .quiz_scores()
                .iter()
                .map(|(id, score)| (id.as_str().to_owned(), u32::from(*score)))
                .collect(),
        }
    }

    /// Convert the record back into a domain `User`.
    ///
    /// Duplicate completed ids collapse into one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a score is out of range or the
    /// user fails domain validation.
    pub fn into_user(self) -> Result<User, StorageError> {
        let quiz_scores = self
            .quiz_scores
            .into_iter()
            .map(|(id, raw)| {
                QuizScore::new(raw)
                    .map(|score| (LessonId::new(id), score))
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        User::from_snapshot(UserSnapshot {
            id: UserId::new(self.id),
            name: self.name,
            email: self.email,
            avatar: self.avatar,
            joined_at: self.joined_at,
            streak: self.streak,
            total_points: self.total_points,
            completed_lessons: self.completed_lessons.into_iter().map(LessonId::new).collect(),
            quiz_scores,
        })
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Encode as the JSON blob stored under [`user_key`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the blob is not a valid record.
    pub fn from_json(payload: &str) -> Result<Self, StorageError> {
        serde_json::from_str(payload).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Key under which a user's state blob is stored.
#[must_use]
pub fn user_key(id: &UserId) -> String {
    format!("tutorAI_user:{id}")
}

/// Repository contract for persisted user state.
///
/// A user is always written whole; there are no partial updates.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by ID.
    ///
    /// Returns `Ok(None)` when nothing has been saved for the ID yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or the blob is corrupt.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError>;

    /// Persist a user, replacing any previous state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the user cannot be stored.
    async fn save_user(&self, user: &User) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        let payload = {
            let guard = self
                .users
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(&user_key(id)).cloned()
        };
        payload
            .map(|p| UserRecord::from_json(&p).and_then(UserRecord::into_user))
            .transpose()
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let payload = UserRecord::from_user(user).to_json()?;
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user_key(user.id()), payload);
        Ok(())
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryRepository::new());
        Self { users }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::time::fixed_now;

    fn build_user() -> User {
        let mut snapshot = UserSnapshot::new(
            UserId::new("1"),
            "Alex Chen",
            "alex@example.com",
            fixed_now(),
        );
        snapshot.streak = 7;
        snapshot.total_points = 2450;
        snapshot.completed_lessons.insert(LessonId::new("calc-1"));
        snapshot
            .quiz_scores
            .insert(LessonId::new("calc-1"), QuizScore::new(85).unwrap());
        User::from_snapshot(snapshot).unwrap()
    }

    #[tokio::test]
    async fn round_trips_user_through_blob() {
        let repo = InMemoryRepository::new();
        let user = build_user();

        repo.save_user(&user).await.unwrap();
        let fetched = repo.get_user(user.id()).await.unwrap();

        assert_eq!(fetched, Some(user));
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let repo = InMemoryRepository::new();
        let fetched = repo.get_user(&UserId::new("nobody")).await.unwrap();
        assert!(fetched.is_none());
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let json = UserRecord::from_user(&build_user()).to_json().unwrap();
        assert!(json.contains("\"completedLessons\":[\"calc-1\"]"));
        assert!(json.contains("\"quizScores\":{\"calc-1\":85}"));
        assert!(json.contains("\"totalPoints\":2450"));
    }

    #[test]
    fn record_rejects_out_of_range_score() {
        let mut record = UserRecord::from_user(&build_user());
        record.quiz_scores.insert("calc-2".into(), 140);

        let err = record.into_user().unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn record_collapses_duplicate_completions() {
        let mut record = UserRecord::from_user(&build_user());
        record.completed_lessons.push("calc-1".into());

        let user = record.into_user().unwrap();
        assert_eq!(user.completed_lessons().len(), 1);
    }
}
