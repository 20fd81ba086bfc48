use crate::model::{Lesson, QuizScore, User};

/// Records a quiz submission for `lesson` and returns the replacement user.
///
/// - `lesson.id` joins the completed set if it is not already there.
/// - The lesson's score is overwritten, including downward on a retake.
/// - `score.points()` is added to the total on every submission, retakes
///   included.
/// - The streak is carried over untouched.
///
/// `lesson` is trusted as-is. Checking that it belongs to the catalog is the
/// caller's job. The input user is not modified.
#[must_use]
pub fn complete(user: &User, lesson: &Lesson, score: QuizScore) -> User {
    let mut next = user.clone();
    next.completed_lessons.insert(lesson.id.clone());
    next.quiz_scores.insert(lesson.id.clone(), score);
    next.total_points = next.total_points.saturating_add(score.points());
    next
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LessonId;
    use crate::test_support::{lesson, user_with};

    fn score(v: u32) -> QuizScore {
        QuizScore::new(v).unwrap()
    }

    #[test]
    fn completion_adds_lesson_score_and_points() {
        let user = user_with(&["calc-1", "calc-2"], &[("calc-1", 85), ("calc-2", 92)]);
        let before = user.total_points();
        let calc3 = lesson("calc-3", "calculus");

        let updated = complete(&user, &calc3, score(92));

        assert!(updated.has_completed(&LessonId::new("calc-3")));
        assert_eq!(updated.score_for(&calc3.id), Some(score(92)));
        assert_eq!(updated.total_points(), before + 920);
        assert_eq!(updated.streak(), user.streak());
        // the input user is untouched
        assert!(!user.has_completed(&calc3.id));
    }

    #[test]
    fn completion_from_2450_points_reaches_3370() {
        let user = user_with(&[], &[]);
        assert_eq!(user.total_points(), 2450);

        let updated = complete(&user, &lesson("calc-3", "calculus"), score(92));

        assert_eq!(updated.total_points(), 3370);
        assert!(updated.has_completed(&LessonId::new("calc-3")));
    }

    #[test]
    fn repeated_completion_keeps_single_entry_but_awards_twice() {
        let user = user_with(&[], &[]);
        let calc1 = lesson("calc-1", "calculus");

        let once = complete(&user, &calc1, score(50));
        let twice = complete(&once, &calc1, score(50));

        assert_eq!(
            twice
                .completed_lessons()
                .iter()
                .filter(|id| **id == calc1.id)
                .count(),
            1
        );
        assert_eq!(twice.total_points(), user.total_points() + 1000);
    }

    #[test]
    fn retake_overwrites_score_even_downward() {
        let user = user_with(&["calc-1"], &[("calc-1", 90)]);
        let calc1 = lesson("calc-1", "calculus");

        let updated = complete(&user, &calc1, score(40));

        assert_eq!(updated.score_for(&calc1.id), Some(score(40)));
        assert_eq!(updated.total_points(), user.total_points() + 400);
    }

    #[test]
    fn zero_score_still_completes() {
        let user = user_with(&[], &[]);
        let calc1 = lesson("calc-1", "calculus");

        let updated = complete(&user, &calc1, score(0));

        assert!(updated.has_completed(&calc1.id));
        assert_eq!(updated.total_points(), user.total_points());
    }
}
