//! Plain-text rendering of service views.

use std::fmt::Write as _;

use services::{DashboardView, LessonListView, ProfileView, QuizSubmission};
use tutor_core::model::{Lesson, ScoreTone, User};

fn tone_marker(tone: ScoreTone) -> &'static str {
    match tone {
        ScoreTone::Success => "+",
        ScoreTone::Warning => "~",
        ScoreTone::Danger => "!",
    }
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let stats = &view.stats;

    let _ = writeln!(out, "Welcome back, {}!", view.user.first_name());
    let _ = writeln!(
        out,
        "Streak {} days | {} points | {}/{} lessons ({}%)",
        stats.streak,
        stats.total_points,
        stats.lessons_completed,
        stats.lessons_total,
        stats.overall_progress_rounded()
    );

    if let Some(rec) = &view.recommendation {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Recommended next: {} ({})",
            rec.subject.name,
            rec.rule.explanation()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Subjects:");
    for (subject, agg) in view.subjects.iter().zip(&view.aggregates) {
        let average = if agg.scored_lessons > 0 {
            format!("avg {:.1}%", agg.average_score)
        } else {
            "no scores yet".to_owned()
        };
        let _ = writeln!(
            out,
            "  {:<12} {:>3}/{:<3} {:>5.1}%  {}",
            subject.name,
            subject.completed_lessons,
            subject.total_lessons,
            subject.progress_percent(),
            average
        );
    }
    out
}

pub fn lesson_list(view: &LessonListView) -> String {
    let mut out = String::new();
    let subject = &view.subject;

    let _ = writeln!(out, "{}: {}", subject.name, subject.description);
    let _ = writeln!(
        out,
        "{}/{} lessons completed",
        subject.completed_lessons, subject.total_lessons
    );
    for status in &view.lessons {
        let mark = if status.completed { "x" } else { " " };
        let score = status
            .score
            .map(|s| format!("  {s}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  [{mark}] {:<8} {} ({}, {} min){score}",
            status.lesson.id,
            status.lesson.title,
            status.lesson.difficulty.label(),
            status.lesson.duration
        );
    }
    out
}

pub fn lesson(lesson: &Lesson) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} [{}]", lesson.title, lesson.id);
    let _ = writeln!(out, "{}", lesson.description);
    if !lesson.prerequisites.is_empty() {
        let names: Vec<_> = lesson.prerequisites.iter().map(|p| p.as_str()).collect();
        let _ = writeln!(out, "Prerequisites: {}", names.join(", "));
    }

    for (n, step) in lesson.steps.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Step {}: {}", n + 1, step.title);
        let _ = writeln!(out, "{}", step.content);
        if let Some(code) = &step.code_example {
            let _ = writeln!(out, "--- {}", step.language.as_deref().unwrap_or("code"));
            let _ = writeln!(out, "{code}");
            let _ = writeln!(out, "---");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Quiz ({} questions):", lesson.quiz.questions.len());
    for (n, question) in lesson.quiz.questions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", n + 1, question.question);
        for (i, option) in question.options.iter().enumerate() {
            let _ = writeln!(out, "   {i}) {option}");
        }
    }
    out
}

pub fn submission(result: &QuizSubmission) -> String {
    let mut out = String::new();
    let grade = &result.grade;

    let _ = writeln!(
        out,
        "[{}] {} {}/{} correct, score {}",
        tone_marker(result.band.tone()),
        result.band.message(),
        grade.correct,
        grade.total,
        grade.score
    );
    for (n, outcome) in grade.outcomes.iter().enumerate() {
        let verdict = if outcome.is_correct {
            "correct"
        } else if outcome.selected.is_none() {
            "unanswered"
        } else {
            "incorrect"
        };
        let _ = writeln!(out, "  {}. {verdict}: {}", n + 1, outcome.explanation);
    }
    let _ = writeln!(
        out,
        "+{} points (total {})",
        result.points_awarded,
        result.user.total_points()
    );
    out
}

pub fn completion(user: &User) -> String {
    format!(
        "Recorded. {} lessons completed, {} points.\n",
        user.completed_lessons().len(),
        user.total_points()
    )
}

pub fn profile(view: &ProfileView) -> String {
    let mut out = String::new();
    let user = &view.user;

    let _ = writeln!(out, "{} <{}>", user.name(), user.email());
    let _ = writeln!(out, "Joined {}", user.joined_at().format("%B %Y"));
    let _ = writeln!(
        out,
        "Lessons {} | Average {}% | Streak {} | Points {}",
        user.completed_lessons().len(),
        view.average_score,
        user.streak(),
        user.total_points()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Achievements:");
    for achievement in &view.achievements {
        let mark = if achievement.earned { "x" } else { " " };
        let _ = writeln!(
            out,
            "  [{mark}] {}: {}",
            achievement.kind.name(),
            achievement.kind.description()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use services::{LearningService, UserService};
    use storage::catalog::builtin_catalog;
    use storage::repository::InMemoryRepository;
    use tutor_core::model::{LessonId, SubjectId, UserId};
    use tutor_core::recommend::RecommendationPolicy;
    use tutor_core::time::fixed_clock;

    fn learning() -> LearningService {
        let users = Arc::new(UserService::new(
            fixed_clock(),
            Arc::new(InMemoryRepository::new()),
        ));
        LearningService::new(
            Arc::new(builtin_catalog().unwrap()),
            RecommendationPolicy::default(),
            users,
        )
    }

    #[tokio::test]
    async fn dashboard_names_recommendation_and_totals() {
        let view = learning().dashboard(&UserId::new("1")).await.unwrap();
        let text = dashboard(&view);

        assert!(text.starts_with("Welcome back, Alex!"));
        assert!(text.contains("3/51 lessons (6%)"));
        assert!(text.contains("Recommended next: Programming"));
        assert!(text.contains("no scores yet"));
    }

    #[tokio::test]
    async fn lesson_list_marks_completed_lessons() {
        let view = learning()
            .lesson_list(&UserId::new("1"), &SubjectId::new("calculus"))
            .await
            .unwrap();
        let text = lesson_list(&view);

        assert!(text.contains("2/12 lessons completed"));
        assert!(text.contains("[x] calc-2"));
        assert!(text.contains("92%"));
    }

    #[test]
    fn lesson_lists_options_with_indices() {
        let service = learning();
        let text = lesson(service.lesson(&LessonId::new("calc-1")).unwrap());

        assert!(text.contains("Quiz (2 questions):"));
        assert!(text.contains("   0) "));
        assert!(text.contains("   3) "));
    }

    #[tokio::test]
    async fn profile_shows_earned_badges() {
        let view = learning().profile(&UserId::new("1")).await.unwrap();
        let text = profile(&view);

        assert!(text.contains("Alex Chen <alex@example.com>"));
        assert!(text.contains("Average 85%"));
        assert!(text.contains("[x] Quiz Master"));
    }
}
