mod catalog;
mod ids;
mod lesson;
mod score;
mod subject;
mod user;

pub use catalog::{Catalog, CatalogError};
pub use ids::{LessonId, ParseIdError, QuestionId, SubjectId, UserId};
pub use lesson::{
    Difficulty, Lesson, LessonStep, Question, QuestionOutcome, Quiz, QuizAnswers, QuizError,
    QuizGrade, StepKind,
};
pub use score::{QuizScore, ScoreBand, ScoreError, ScoreTone};
pub use subject::Subject;
pub use user::{User, UserError, UserSnapshot};
