use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::UserRepository;
use tutor_core::error::Error as DomainError;
use tutor_core::model::{LessonId, QuizScore, User, UserId, UserSnapshot};

use crate::Clock;
use crate::error::UserServiceError;

/// Lessons and scores of the demo learner.
const DEMO_SCORES: [(&str, u32); 3] = [("calc-1", 85), ("calc-2", 92), ("prog-1", 78)];

/// The demo learner written to an empty store.
///
/// # Errors
///
/// Returns a domain error if the profile fails validation.
pub fn demo_profile(id: UserId, joined_at: DateTime<Utc>) -> Result<User, DomainError> {
    let mut snapshot = UserSnapshot::new(id, "Alex Chen", "alex@example.com", joined_at);
    snapshot.streak = 7;
    snapshot.total_points = 2450;
    for (lesson, score) in DEMO_SCORES {
        let lesson = LessonId::new(lesson);
        snapshot.completed_lessons.insert(lesson.clone());
        snapshot.quiz_scores.insert(lesson, QuizScore::new(score)?);
    }
    Ok(User::from_snapshot(snapshot)?)
}

/// Loads and stores whole user snapshots.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Fetch the user, writing the demo profile first if none is stored.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the repository fails and
    /// `UserServiceError::Domain` if the demo profile fails validation.
    pub async fn load_or_bootstrap(&self, id: &UserId) -> Result<User, UserServiceError> {
        self.ensure(id).await.map(|(user, _)| user)
    }

    /// Like [`Self::load_or_bootstrap`], also reporting whether the user was
    /// created by this call.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the repository fails and
    /// `UserServiceError::Domain` if the demo profile fails validation.
    pub async fn ensure(&self, id: &UserId) -> Result<(User, bool), UserServiceError> {
        if let Some(user) = self.users.get_user(id).await? {
            tracing::debug!(user_id = %id, "loaded user");
            return Ok((user, false));
        }

        let user = demo_profile(id.clone(), self.clock.now())?;
        self.users.save_user(&user).await?;
        tracing::info!(user_id = %id, "bootstrapped new user");
        Ok((user, true))
    }

    /// Overwrite whatever is stored for `id` with the demo profile.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the repository fails and
    /// `UserServiceError::Domain` if the demo profile fails validation.
    pub async fn seed(&self, id: &UserId) -> Result<User, UserServiceError> {
        let user = demo_profile(id.clone(), self.clock.now())?;
        self.users.save_user(&user).await?;
        tracing::info!(user_id = %id, "seeded demo user");
        Ok(user)
    }

    /// Persist a replacement snapshot.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the repository fails.
    pub async fn save(&self, user: &User) -> Result<(), UserServiceError> {
        self.users.save_user(user).await?;
        Ok(())
    }
}
