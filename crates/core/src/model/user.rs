use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, UserId};
use crate::model::score::QuizScore;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("user name cannot be empty")]
    EmptyName,
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A learner and everything the app remembers about them.
///
/// `User` is a value: there are no setters. A lesson completion produces a new
/// `User` (see [`crate::updater::complete`]) that replaces the old one as a
/// whole, so every derived aggregate is computed from one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) id: UserId,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) avatar: Option<String>,
    pub(crate) joined_at: DateTime<Utc>,
    pub(crate) streak: u32,
    pub(crate) total_points: u64,
    pub(crate) completed_lessons: BTreeSet<LessonId>,
    pub(crate) quiz_scores: BTreeMap<LessonId, QuizScore>,
}

/// Plain field bag used to build a `User` from storage or fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSnapshot {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub streak: u32,
    pub total_points: u64,
    pub completed_lessons: BTreeSet<LessonId>,
    pub quiz_scores: BTreeMap<LessonId, QuizScore>,
}

impl UserSnapshot {
    /// A fresh account with no progress.
    #[must_use]
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            avatar: None,
            joined_at,
            streak: 0,
            total_points: 0,
            completed_lessons: BTreeSet::new(),
            quiz_scores: BTreeMap::new(),
        }
    }
}

impl User {
    /// Validates a snapshot into a `User`.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the trimmed name is empty.
    pub fn from_snapshot(snapshot: UserSnapshot) -> Result<Self, UserError> {
        let name = snapshot.name.trim().to_owned();
        if name.is_empty() {
            return Err(UserError::EmptyName);
        }

        Ok(Self {
            id: snapshot.id,
            name,
            email: snapshot.email.trim().to_owned(),
            avatar: snapshot
                .avatar
                .map(|a| a.trim().to_owned())
                .filter(|a| !a.is_empty()),
            joined_at: snapshot.joined_at,
            streak: snapshot.streak,
            total_points: snapshot.total_points,
            completed_lessons: snapshot.completed_lessons,
            quiz_scores: snapshot.quiz_scores,
        })
    }

    #[must_use]
    pub fn to_snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            joined_at: self.joined_at,
            streak: self.streak,
            total_points: self.total_points,
            completed_lessons: self.completed_lessons.clone(),
            quiz_scores: self.quiz_scores.clone(),
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First word of the display name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Consecutive active days. Maintained outside this crate.
    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn has_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &BTreeMap<LessonId, QuizScore> {
        &self.quiz_scores
    }

    #[must_use]
    pub fn score_for(&self, lesson_id: &LessonId) -> Option<QuizScore> {
        self.quiz_scores.get(lesson_id).copied()
    }

    /// Mean of every recorded quiz score, rounded; 0 when there are none.
    #[must_use]
    pub fn average_quiz_score(&self) -> u8 {
        if self.quiz_scores.is_empty() {
            return 0;
        }
        let sum: u64 = self.quiz_scores.values().map(|s| u64::from(s.value())).sum();
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mean = (sum as f64 / self.quiz_scores.len() as f64).round() as u8;
        mean
    }

    /// Highest recorded quiz score, if any.
    #[must_use]
    pub fn best_quiz_score(&self) -> Option<QuizScore> {
        self.quiz_scores.values().copied().max()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
