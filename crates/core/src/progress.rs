//! Per-subject progress derived from a user snapshot and the lesson catalog.
//!
//! Everything here is a pure function of its inputs. Nothing is cached: the
//! caller recomputes after every user replacement so displayed progress can
//! never lag the persisted state.

use crate::model::{Lesson, Subject, SubjectId, User};

//
// ─── SUBJECT AGGREGATE ─────────────────────────────────────────────────────────
//

/// Derived statistics for one subject. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectAggregate {
    pub subject_id: SubjectId,
    /// Catalog lessons belonging to the subject.
    pub total_lessons: usize,
    /// Catalog lessons of the subject the user has completed.
    pub completed_lessons: usize,
    /// Completed lessons that also have a recorded quiz score.
    pub scored_lessons: usize,
    /// Mean recorded score over the completed lessons; 0 when none are scored.
    pub average_score: f64,
    /// `0 < completed_lessons < total_lessons`.
    pub has_progress: bool,
}

impl SubjectAggregate {
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.completed_lessons == 0
    }
}

/// Computes one aggregate per subject, in input order.
///
/// A completed lesson without a recorded score does not count toward the
/// average's denominator. Treating it as 0 would drag a subject below the
/// struggling threshold even though the learner never failed anything.
#[must_use]
pub fn aggregate(user: &User, subjects: &[Subject], lessons: &[Lesson]) -> Vec<SubjectAggregate> {
    subjects
        .iter()
        .map(|subject| aggregate_subject(user, &subject.id, lessons))
        .collect()
}

fn aggregate_subject(user: &User, subject_id: &SubjectId, lessons: &[Lesson]) -> SubjectAggregate {
    let mut total_lessons = 0;
    let mut completed_lessons = 0;
    let mut scored_lessons = 0;
    let mut score_sum = 0_u64;

    for lesson in lessons.iter().filter(|l| &l.subject_id == subject_id) {
        total_lessons += 1;
        if !user.has_completed(&lesson.id) {
            continue;
        }
        completed_lessons += 1;
        if let Some(score) = user.score_for(&lesson.id) {
            scored_lessons += 1;
            score_sum += u64::from(score.value());
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let average_score = if scored_lessons > 0 {
        score_sum as f64 / scored_lessons as f64
    } else {
        0.0
    };

    SubjectAggregate {
        subject_id: subject_id.clone(),
        total_lessons,
        completed_lessons,
        scored_lessons,
        average_score,
        has_progress: completed_lessons > 0 && completed_lessons < total_lessons,
    }
}

//
// ─── SUBJECT REFRESH ───────────────────────────────────────────────────────────
//

/// Returns copies of `subjects` whose `completed_lessons` reflects `user`.
///
/// The count is the number of catalog lessons of the subject the user has
/// completed; completions for lessons outside the catalog are ignored.
#[must_use]
pub fn with_progress(subjects: &[Subject], user: &User, lessons: &[Lesson]) -> Vec<Subject> {
    subjects
        .iter()
        .map(|subject| {
            let completed = lessons
                .iter()
                .filter(|l| l.subject_id == subject.id && user.has_completed(&l.id))
                .count();
            Subject {
                completed_lessons: u32::try_from(completed).unwrap_or(u32::MAX),
                ..subject.clone()
            }
        })
        .collect()
}

//
// ─── DASHBOARD STATS ───────────────────────────────────────────────────────────
//

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub lessons_completed: u32,
    pub lessons_total: u32,
    /// `lessons_completed / lessons_total * 100`, 0 for an empty catalog.
    pub overall_progress: f64,
    pub streak: u32,
    pub total_points: u64,
}

impl DashboardStats {
    /// Computes stats from subjects already refreshed with [`with_progress`].
    #[must_use]
    pub fn compute(user: &User, subjects: &[Subject]) -> Self {
        let lessons_total: u32 = subjects.iter().map(|s| s.total_lessons).sum();
        let lessons_completed: u32 = subjects.iter().map(|s| s.completed_lessons).sum();
        let overall_progress = if lessons_total > 0 {
            f64::from(lessons_completed) / f64::from(lessons_total) * 100.0
        } else {
            0.0
        };

        Self {
            lessons_completed,
            lessons_total,
            overall_progress,
            streak: user.streak(),
            total_points: user.total_points(),
        }
    }

    /// Overall progress rounded to a whole percent.
    #[must_use]
    pub fn overall_progress_rounded(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.overall_progress.round() as u32;
        rounded
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lesson, subject, user_with};

    fn catalog() -> (Vec<Subject>, Vec<Lesson>) {
        (
            vec![subject("calculus", 12), subject("physics", 14)],
            vec![
                lesson("calc-1", "calculus"),
                lesson("calc-2", "calculus"),
                lesson("calc-3", "calculus"),
                lesson("phys-1", "physics"),
            ],
        )
    }

    #[test]
    fn untouched_subjects_have_zero_average_and_no_progress() {
        let (subjects, lessons) = catalog();
        let user = user_with(&[], &[]);

        let aggregates = aggregate(&user, &subjects, &lessons);

        assert_eq!(aggregates.len(), 2);
        for agg in &aggregates {
            assert_eq!(agg.completed_lessons, 0);
            assert_eq!(agg.average_score, 0.0);
            assert!(!agg.has_progress);
            assert!(agg.is_untouched());
        }
    }

    #[test]
    fn averages_only_scored_completions() {
        let (subjects, lessons) = catalog();
        // calc-2 completed without a score: it must not drag the mean down.
        let user = user_with(&["calc-1", "calc-2"], &[("calc-1", 60)]);

        let aggregates = aggregate(&user, &subjects, &lessons);
        let calc = &aggregates[0];

        assert_eq!(calc.completed_lessons, 2);
        assert_eq!(calc.scored_lessons, 1);
        assert_eq!(calc.average_score, 60.0);
        assert!(calc.has_progress);
    }

    #[test]
    fn scores_for_uncompleted_lessons_are_ignored() {
        let (subjects, lessons) = catalog();
        let user = user_with(&["calc-1"], &[("calc-1", 80), ("calc-2", 10)]);

        let calc = &aggregate(&user, &subjects, &lessons)[0];
        assert_eq!(calc.average_score, 80.0);
    }

    #[test]
    fn fully_completed_subject_is_not_in_progress() {
        let (subjects, lessons) = catalog();
        let user = user_with(&["phys-1"], &[("phys-1", 90)]);

        let phys = &aggregate(&user, &subjects, &lessons)[1];
        assert_eq!(phys.completed_lessons, phys.total_lessons);
        assert!(!phys.has_progress);
    }

    #[test]
    fn empty_catalog_yields_no_aggregates() {
        let user = user_with(&["calc-1"], &[("calc-1", 50)]);
        assert!(aggregate(&user, &[], &[]).is_empty());
    }

    #[test]
    fn with_progress_recounts_from_catalog() {
        let (subjects, lessons) = catalog();
        let user = user_with(&["calc-1", "calc-3", "gone-1"], &[]);

        let refreshed = with_progress(&subjects, &user, &lessons);

        assert_eq!(refreshed[0].completed_lessons, 2);
        assert_eq!(refreshed[1].completed_lessons, 0);
        assert_eq!(refreshed[0].total_lessons, 12);
    }

    #[test]
    fn dashboard_stats_sum_refreshed_subjects() {
        let (subjects, lessons) = catalog();
        let user = user_with(&["calc-1", "calc-2", "phys-1"], &[]);
        let refreshed = with_progress(&subjects, &user, &lessons);

        let stats = DashboardStats::compute(&user, &refreshed);

        assert_eq!(stats.lessons_completed, 3);
        assert_eq!(stats.lessons_total, 26);
        assert_eq!(stats.overall_progress_rounded(), 12);
        assert_eq!(DashboardStats::compute(&user, &[]).overall_progress, 0.0);
    }
}
