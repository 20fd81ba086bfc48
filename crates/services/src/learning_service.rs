use std::sync::Arc;

use tutor_core::achievements::{Achievement, achievements};
use tutor_core::model::{
    Catalog, Lesson, LessonId, QuizAnswers, QuizGrade, QuizScore, ScoreBand, Subject, SubjectId,
    User, UserId,
};
use tutor_core::progress::{DashboardStats, SubjectAggregate, aggregate, with_progress};
use tutor_core::recommend::{RecommendationPolicy, RecommendationRule, recommend};
use tutor_core::updater::complete;

use crate::error::LearningServiceError;
use crate::user_service::UserService;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationView {
    pub subject: Subject,
    pub rule: RecommendationRule,
}

/// Everything the dashboard shows, computed from one user snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub user: User,
    /// Catalog subjects with `completed_lessons` recomputed for this user.
    pub subjects: Vec<Subject>,
    pub aggregates: Vec<SubjectAggregate>,
    pub recommendation: Option<RecommendationView>,
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonStatus {
    pub lesson: Lesson,
    pub completed: bool,
    pub score: Option<QuizScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonListView {
    pub subject: Subject,
    pub lessons: Vec<LessonStatus>,
}

/// Outcome of grading and recording a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSubmission {
    pub grade: QuizGrade,
    pub band: ScoreBand,
    pub points_awarded: u64,
    /// The replacement user, already persisted.
    pub user: User,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub user: User,
    pub average_score: u8,
    pub achievements: Vec<Achievement>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Learner-facing reads and writes over a fixed catalog.
#[derive(Clone)]
pub struct LearningService {
    catalog: Arc<Catalog>,
    policy: RecommendationPolicy,
    users: Arc<UserService>,
}

impl LearningService {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        policy: RecommendationPolicy,
        users: Arc<UserService>,
    ) -> Self {
        Self {
            catalog,
            policy,
            users,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Build the dashboard for a user, bootstrapping them if needed.
    ///
    /// # Errors
    ///
    /// Returns `LearningServiceError::User` if the user cannot be loaded.
    pub async fn dashboard(&self, user_id: &UserId) -> Result<DashboardView, LearningServiceError> {
        let user = self.load_user(user_id).await?;
        let subjects = self.catalog.subjects();
        let lessons = self.catalog.lessons();

        let aggregates = aggregate(&user, subjects, lessons);
        let recommendation =
            recommend(&aggregates, subjects, &self.policy).map(|rec| RecommendationView {
                subject: rec.subject.clone(),
                rule: rec.rule,
            });
        let refreshed = with_progress(subjects, &user, lessons);
        let stats = DashboardStats::compute(&user, &refreshed);

        Ok(DashboardView {
            user,
            subjects: refreshed,
            aggregates,
            recommendation,
            stats,
        })
    }

    /// Lessons of one subject in catalog order, with the user's status on each.
    ///
    /// # Errors
    ///
    /// Returns `LearningServiceError::UnknownSubject` if the catalog has no
    /// such subject.
    pub async fn lesson_list(
        &self,
        user_id: &UserId,
        subject_id: &SubjectId,
    ) -> Result<LessonListView, LearningServiceError> {
        let subject = self
            .catalog
            .subject(subject_id)
            .ok_or_else(|| LearningServiceError::UnknownSubject(subject_id.clone()))?;
        let user = self.load_user(user_id).await?;

        let subject = with_progress(std::slice::from_ref(subject), &user, self.catalog.lessons())
            .into_iter()
            .next()
            .unwrap_or_else(|| subject.clone());
        let lessons = self
            .catalog
            .lessons_for(subject_id)
            .map(|lesson| LessonStatus {
                completed: user.has_completed(&lesson.id),
                score: user.score_for(&lesson.id),
                lesson: lesson.clone(),
            })
            .collect();

        Ok(LessonListView { subject, lessons })
    }

    /// # Errors
    ///
    /// Returns `LearningServiceError::UnknownLesson` if the catalog has no
    /// such lesson.
    pub fn lesson(&self, lesson_id: &LessonId) -> Result<&Lesson, LearningServiceError> {
        self.catalog
            .lesson(lesson_id)
            .ok_or_else(|| LearningServiceError::UnknownLesson(lesson_id.clone()))
    }

    /// Grade a quiz, record the completion and persist the new user.
    ///
    /// Every question must be answered.
    ///
    /// # Errors
    ///
    /// Returns `LearningServiceError::UnknownLesson` for a lesson outside the
    /// catalog, `LearningServiceError::Quiz` for answers that do not fit the
    /// quiz or leave a question unanswered, and `LearningServiceError::User`
    /// if persistence fails. Nothing is saved on error.
    pub async fn submit_quiz(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        answers: &QuizAnswers,
    ) -> Result<QuizSubmission, LearningServiceError> {
        let lesson = self.lesson(lesson_id)?;
        let grade = lesson.quiz.grade(answers)?;
        lesson.quiz.ensure_complete(answers)?;
        let user = self.record(user_id, lesson, grade.score).await?;

        Ok(QuizSubmission {
            band: grade.score.band(),
            points_awarded: grade.score.points(),
            grade,
            user,
        })
    }

    /// Record a completion with an already-known score.
    ///
    /// # Errors
    ///
    /// Returns `LearningServiceError::UnknownLesson` for a lesson outside the
    /// catalog and `LearningServiceError::User` if persistence fails.
    pub async fn complete_lesson(
        &self,
        user_id: &UserId,
        lesson_id: &LessonId,
        score: QuizScore,
    ) -> Result<User, LearningServiceError> {
        let lesson = self.lesson(lesson_id)?;
        self.record(user_id, lesson, score).await
    }

    /// # Errors
    ///
    /// Returns `LearningServiceError::User` if the user cannot be loaded.
    pub async fn profile(&self, user_id: &UserId) -> Result<ProfileView, LearningServiceError> {
        let user = self.load_user(user_id).await?;
        Ok(ProfileView {
            average_score: user.average_quiz_score(),
            achievements: achievements(&user),
            user,
        })
    }

    async fn record(
        &self,
        user_id: &UserId,
        lesson: &Lesson,
        score: QuizScore,
    ) -> Result<User, LearningServiceError> {
        let user = self.load_user(user_id).await?;
        let updated = complete(&user, lesson, score);
        self.users.save(&updated).await?;
        tracing::info!(
            user_id = %user_id,
            lesson_id = %lesson.id,
            score = score.value(),
            total_points = updated.total_points(),
            "lesson completed"
        );
        Ok(updated)
    }

    async fn load_user(&self, user_id: &UserId) -> Result<User, LearningServiceError> {
        let user = self.users.load_or_bootstrap(user_id).await?;
        for lesson_id in user.quiz_scores().keys() {
            if self.catalog.lesson(lesson_id).is_none() {
                tracing::warn!(
                    user_id = %user_id,
                    lesson_id = %lesson_id,
                    "stored score for a lesson missing from the catalog"
                );
            }
        }
        Ok(user)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
