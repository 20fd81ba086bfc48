use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LessonId, QuestionId, SubjectId};
use crate::model::score::QuizScore;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} needs at least two options")]
    TooFewOptions(QuestionId),

    #[error("question {question} marks option {index} correct but has {options} options")]
    CorrectAnswerOutOfRange {
        question: QuestionId,
        index: usize,
        options: usize,
    },

    #[error("only {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("answer for unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {question} has no option {selected}")]
    AnswerOutOfRange {
        question: QuestionId,
        selected: usize,
    },
}

//
// ─── LESSON CONTENT ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Text,
    Code,
    Formula,
    Example,
}

/// One screen of a lesson, shown in order before the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStep {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A single unit of instruction: ordered steps followed by one quiz.
///
/// Lessons are catalog data and never change after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: LessonId,
    pub subject_id: SubjectId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Expected duration in minutes.
    pub duration: u32,
    pub steps: Vec<LessonStep>,
    pub quiz: Quiz,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<LessonId>,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub questions: Vec<Question>,
}

/// Selected option index per question.
pub type QuizAnswers = HashMap<QuestionId, usize>;

/// Result for a single question after grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// Graded quiz submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizGrade {
    pub correct: usize,
    pub total: usize,
    pub score: QuizScore,
    pub outcomes: Vec<QuestionOutcome>,
}

impl Quiz {
    /// Checks the structural invariants of the quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the quiz is empty, repeats a question id, has a
    /// question with fewer than two options, or marks a non-existent option
    /// as correct.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let mut seen = HashSet::with_capacity(self.questions.len());
        for q in &self.questions {
            if !seen.insert(&q.id) {
                return Err(QuizError::DuplicateQuestion(q.id.clone()));
            }
            if q.options.len() < 2 {
                return Err(QuizError::TooFewOptions(q.id.clone()));
            }
            if q.correct_answer >= q.options.len() {
                return Err(QuizError::CorrectAnswerOutOfRange {
                    question: q.id.clone(),
                    index: q.correct_answer,
                    options: q.options.len(),
                });
            }
        }
        Ok(())
    }

    /// True when every question has a selected answer.
    #[must_use]
    pub fn is_complete(&self, answers: &QuizAnswers) -> bool {
        self.questions.iter().all(|q| answers.contains_key(&q.id))
    }

    /// Fails with `QuizError::Incomplete` unless every question is answered.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Incomplete` with the answered and total counts.
    pub fn ensure_complete(&self, answers: &QuizAnswers) -> Result<(), QuizError> {
        if self.is_complete(answers) {
            return Ok(());
        }
        let answered = self
            .questions
            .iter()
            .filter(|q| answers.contains_key(&q.id))
            .count();
        Err(QuizError::Incomplete {
            answered,
            total: self.questions.len(),
        })
    }

    /// Grades a submission.
    ///
    /// Unanswered questions count as incorrect. The score is the share of
    /// correct answers over all questions, rounded to a whole percent.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownQuestion` for answers to questions not in
    /// this quiz, and `QuizError::AnswerOutOfRange` for a selected index the
    /// question does not offer. Unknown questions are reported first, by
    /// smallest id, then out-of-range answers in question order.
    pub fn grade(&self, answers: &QuizAnswers) -> Result<QuizGrade, QuizError> {
        if let Some(unknown) = answers
            .keys()
            .filter(|id| !self.questions.iter().any(|q| &q.id == *id))
            .min()
        {
            return Err(QuizError::UnknownQuestion(unknown.clone()));
        }
        for q in &self.questions {
            if let Some(&selected) = answers.get(&q.id) {
                if selected >= q.options.len() {
                    return Err(QuizError::AnswerOutOfRange {
                        question: q.id.clone(),
                        selected,
                    });
                }
            }
        }

        let outcomes: Vec<QuestionOutcome> = self
            .questions
            .iter()
            .map(|q| {
                let selected = answers.get(&q.id).copied();
                QuestionOutcome {
                    question_id: q.id.clone(),
                    selected,
                    correct_answer: q.correct_answer,
                    is_correct: selected == Some(q.correct_answer),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        let correct = outcomes.iter().filter(|o| o.is_correct).count();
        let total = self.questions.len();

        Ok(QuizGrade {
            correct,
            total,
            score: QuizScore::from_ratio(correct, total),
            outcomes,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
