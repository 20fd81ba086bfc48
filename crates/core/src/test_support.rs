//! Fixture builders shared by unit tests.

use crate::model::{
    Difficulty, Lesson, LessonId, LessonStep, Question, QuestionId, Quiz, QuizScore, StepKind,
    Subject, SubjectId, User, UserId, UserSnapshot,
};
use crate::time::fixed_now;

pub(crate) fn subject(id: &str, total_lessons: u32) -> Subject {
    Subject {
        id: SubjectId::new(id),
        name: id.to_uppercase(),
        description: format!("All about {id}"),
        icon: "Book".into(),
        color: "#000000".into(),
        gradient: "from-gray-500 to-gray-700".into(),
        total_lessons,
        completed_lessons: 0,
    }
}

pub(crate) fn lesson(id: &str, subject_id: &str) -> Lesson {
    Lesson {
        id: LessonId::new(id),
        subject_id: SubjectId::new(subject_id),
        title: format!("Lesson {id}"),
        description: String::new(),
        difficulty: Difficulty::Beginner,
        duration: 20,
        steps: vec![LessonStep {
            id: "step-1".into(),
            title: "Intro".into(),
            content: "Read this.".into(),
            kind: StepKind::Text,
            code_example: None,
            language: None,
        }],
        quiz: Quiz {
            id: format!("quiz-{id}"),
            questions: vec![Question {
                id: QuestionId::new("q1"),
                question: "Pick the second option".into(),
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_answer: 1,
                explanation: "b is second".into(),
            }],
        },
        prerequisites: Vec::new(),
    }
}

/// A user shaped like the seeded profile (streak 7, 2450 points) with the
/// given completions and scores.
pub(crate) fn user_with(completed: &[&str], scores: &[(&str, u32)]) -> User {
    let mut snapshot = UserSnapshot::new(
        UserId::new("1"),
        "Alex Chen",
        "alex@example.com",
        fixed_now(),
    );
    snapshot.streak = 7;
    snapshot.total_points = 2450;
    snapshot.completed_lessons = completed.iter().map(|id| LessonId::new(*id)).collect();
    snapshot.quiz_scores = scores
        .iter()
        .map(|(id, v)| (LessonId::new(*id), QuizScore::new(*v).unwrap()))
        .collect();
    User::from_snapshot(snapshot).unwrap()
}
