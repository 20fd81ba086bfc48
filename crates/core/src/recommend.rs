use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Lesson, Subject, SubjectId, User};
use crate::progress::{SubjectAggregate, aggregate};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("threshold must be in (0, 100], got {provided}")]
    InvalidThreshold { provided: f64 },

    #[error("progression lists subject {0} more than once")]
    DuplicateProgression(SubjectId),
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Tunable inputs of the recommendation rules.
///
/// # Examples
///
/// ```
/// # use tutor_core::recommend::RecommendationPolicy;
/// let policy = RecommendationPolicy::default();
/// assert_eq!(policy.struggling_threshold(), 70.0);
/// assert_eq!(policy.mastery_threshold(), 80.0);
/// assert_eq!(policy.progression()[0].as_str(), "calculus");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationPolicy {
    struggling_threshold: f64,
    mastery_threshold: f64,
    progression: Vec<SubjectId>,
}

impl RecommendationPolicy {
    pub const DEFAULT_STRUGGLING_THRESHOLD: f64 = 70.0;
    pub const DEFAULT_MASTERY_THRESHOLD: f64 = 80.0;
    pub const DEFAULT_PROGRESSION: [&'static str; 4] =
        ["calculus", "programming", "statistics", "physics"];

    /// Builds a policy.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidThreshold` if a threshold is not finite or
    /// outside (0, 100], and `PolicyError::DuplicateProgression` if a subject
    /// appears twice in the progression.
    pub fn new(
        struggling_threshold: f64,
        mastery_threshold: f64,
        progression: Vec<SubjectId>,
    ) -> Result<Self, PolicyError> {
        for provided in [struggling_threshold, mastery_threshold] {
            if !provided.is_finite() || provided <= 0.0 || provided > 100.0 {
                return Err(PolicyError::InvalidThreshold { provided });
            }
        }

        let mut seen = HashSet::with_capacity(progression.len());
        for id in &progression {
            if !seen.insert(id) {
                return Err(PolicyError::DuplicateProgression(id.clone()));
            }
        }

        Ok(Self {
            struggling_threshold,
            mastery_threshold,
            progression,
        })
    }

    /// Default thresholds with a custom progression order.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::DuplicateProgression` on repeated subjects.
    pub fn with_progression(progression: Vec<SubjectId>) -> Result<Self, PolicyError> {
        Self::new(
            Self::DEFAULT_STRUGGLING_THRESHOLD,
            Self::DEFAULT_MASTERY_THRESHOLD,
            progression,
        )
    }

    #[must_use]
    pub fn struggling_threshold(&self) -> f64 {
        self.struggling_threshold
    }

    #[must_use]
    pub fn mastery_threshold(&self) -> f64 {
        self.mastery_threshold
    }

    #[must_use]
    pub fn progression(&self) -> &[SubjectId] {
        &self.progression
    }

    fn is_struggling(&self, agg: &SubjectAggregate) -> bool {
        agg.average_score > 0.0 && agg.average_score < self.struggling_threshold
    }

    fn is_mastered(&self, agg: &SubjectAggregate) -> bool {
        agg.average_score >= self.mastery_threshold
    }
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            struggling_threshold: Self::DEFAULT_STRUGGLING_THRESHOLD,
            mastery_threshold: Self::DEFAULT_MASTERY_THRESHOLD,
            progression: Self::DEFAULT_PROGRESSION
                .iter()
                .map(|id| SubjectId::new(*id))
                .collect(),
        }
    }
}

//
// ─── RECOMMENDATION ────────────────────────────────────────────────────────────
//

/// Which rule produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationRule {
    /// Average score above zero but below the struggling threshold.
    Struggling,
    /// Some, but not all, lessons completed.
    InProgress,
    /// Next subject in the progression after a mastered one.
    Progression,
    /// Nothing else applied.
    Default,
}

impl RecommendationRule {
    #[must_use]
    pub fn explanation(self) -> &'static str {
        match self {
            Self::Struggling => "your quiz average here is below the target, so keep reinforcing it",
            Self::InProgress => "you are partway through this subject",
            Self::Progression => "it is the next step after what you have mastered",
            Self::Default => "it is a good place to start",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation<'a> {
    pub subject: &'a Subject,
    pub rule: RecommendationRule,
}

/// Picks the subject to study next.
///
/// Rules are tried once, in order, and the first match wins:
///
/// 1. the first aggregate whose average is in `(0, struggling)`;
/// 2. the first aggregate with partial progress;
/// 3. if any aggregate is mastered, the first progression subject that is not;
/// 4. the first subject with nothing completed, else the first subject.
///
/// Ties resolve by input order. Aggregates whose subject is not in `subjects`
/// are skipped, as are progression ids the catalog does not know. Returns
/// `None` only when `subjects` is empty.
#[must_use]
pub fn recommend<'a>(
    aggregates: &[SubjectAggregate],
    subjects: &'a [Subject],
    policy: &RecommendationPolicy,
) -> Option<Recommendation<'a>> {
    if let Some(rec) = first_matching(aggregates, subjects, RecommendationRule::Struggling, |agg| {
        policy.is_struggling(agg)
    }) {
        return Some(rec);
    }

    if let Some(rec) = first_matching(aggregates, subjects, RecommendationRule::InProgress, |agg| {
        agg.has_progress
    }) {
        return Some(rec);
    }

    let mastered: HashSet<&SubjectId> = aggregates
        .iter()
        .filter(|agg| policy.is_mastered(agg))
        .map(|agg| &agg.subject_id)
        .collect();
    if !mastered.is_empty() {
        let next = policy
            .progression()
            .iter()
            .filter(|id| !mastered.contains(id))
            .find_map(|id| find_subject(subjects, id));
        if let Some(subject) = next {
            return Some(Recommendation {
                subject,
                rule: RecommendationRule::Progression,
            });
        }
    }

    first_matching(aggregates, subjects, RecommendationRule::Default, |agg| {
        agg.is_untouched()
    })
    .or_else(|| {
        subjects.first().map(|subject| Recommendation {
            subject,
            rule: RecommendationRule::Default,
        })
    })
}

fn find_subject<'a>(subjects: &'a [Subject], id: &SubjectId) -> Option<&'a Subject> {
    subjects.iter().find(|s| &s.id == id)
}

fn first_matching<'a>(
    aggregates: &[SubjectAggregate],
    subjects: &'a [Subject],
    rule: RecommendationRule,
    pred: impl Fn(&SubjectAggregate) -> bool,
) -> Option<Recommendation<'a>> {
    aggregates
        .iter()
        .filter(|agg| pred(agg))
        .find_map(|agg| find_subject(subjects, &agg.subject_id))
        .map(|subject| Recommendation { subject, rule })
}

/// Aggregates `user` against the catalog, then recommends.
#[must_use]
pub fn recommend_for<'a>(
    user: &User,
    subjects: &'a [Subject],
    lessons: &[Lesson],
    policy: &RecommendationPolicy,
) -> Option<Recommendation<'a>> {
    let aggregates = aggregate(user, subjects, lessons);
    recommend(&aggregates, subjects, policy)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{lesson, subject, user_with};

    fn agg(id: &str, total: usize, completed: usize, avg: f64) -> SubjectAggregate {
        SubjectAggregate {
            subject_id: SubjectId::new(id),
            total_lessons: total,
            completed_lessons: completed,
            scored_lessons: if avg > 0.0 { completed } else { 0 },
            average_score: avg,
            has_progress: completed > 0 && completed < total,
        }
    }

    fn four_subjects() -> Vec<Subject> {
        ["calculus", "programming", "statistics", "physics"]
            .into_iter()
            .map(|id| subject(id, 3))
            .collect()
    }

    #[test]
    fn struggling_beats_in_progress() {
        let subjects = vec![subject("programming", 3), subject("calculus", 3)];
        // programming is in progress (1 of 3, unscored), calculus averages 65.
        let aggregates = vec![agg("programming", 3, 1, 0.0), agg("calculus", 3, 3, 65.0)];

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        assert_eq!(rec.subject.id.as_str(), "calculus");
        assert_eq!(rec.rule, RecommendationRule::Struggling);
    }

    #[test]
    fn struggling_threshold_is_strict() {
        let subjects = four_subjects();
        let aggregates = vec![
            agg("calculus", 3, 3, 70.0),
            agg("programming", 3, 0, 0.0),
            agg("statistics", 3, 0, 0.0),
            agg("physics", 3, 0, 0.0),
        ];

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        // 70 is neither struggling nor mastered, so the default rule applies.
        assert_eq!(rec.rule, RecommendationRule::Default);
        assert_eq!(rec.subject.id.as_str(), "programming");
    }

    #[test]
    fn in_progress_picks_first_in_input_order() {
        let subjects = four_subjects();
        let aggregates = vec![
            agg("calculus", 3, 0, 0.0),
            agg("programming", 3, 2, 95.0),
            agg("statistics", 3, 1, 85.0),
            agg("physics", 3, 0, 0.0),
        ];

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        assert_eq!(rec.subject.id.as_str(), "programming");
        assert_eq!(rec.rule, RecommendationRule::InProgress);
    }

    #[test]
    fn mastery_walks_progression_order() {
        let subjects = four_subjects();
        let aggregates = vec![
            agg("calculus", 3, 3, 80.0),
            agg("programming", 3, 0, 0.0),
            agg("statistics", 3, 0, 0.0),
            agg("physics", 3, 0, 0.0),
        ];

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        assert_eq!(rec.subject.id.as_str(), "programming");
        assert_eq!(rec.rule, RecommendationRule::Progression);
    }

    #[test]
    fn progression_follows_policy_not_input_order() {
        // Input order puts physics first; the progression still decides.
        let subjects = vec![
            subject("physics", 3),
            subject("statistics", 3),
            subject("programming", 3),
            subject("calculus", 3),
        ];
        let aggregates = vec![
            agg("physics", 3, 0, 0.0),
            agg("statistics", 3, 0, 0.0),
            agg("programming", 3, 3, 88.0),
            agg("calculus", 3, 3, 91.0),
        ];

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        assert_eq!(rec.subject.id.as_str(), "statistics");
    }

    #[test]
    fn all_mastered_falls_through_to_default() {
        let subjects = four_subjects();
        let aggregates: Vec<_> = subjects
            .iter()
            .map(|s| agg(s.id.as_str(), 3, 3, 95.0))
            .collect();

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        assert_eq!(rec.rule, RecommendationRule::Default);
        assert_eq!(rec.subject.id.as_str(), "calculus");
    }

    #[test]
    fn progression_skips_subjects_missing_from_catalog() {
        let subjects = vec![subject("calculus", 3), subject("physics", 3)];
        let aggregates = vec![agg("calculus", 3, 3, 85.0), agg("physics", 3, 0, 0.0)];

        let rec = recommend(&aggregates, &subjects, &RecommendationPolicy::default()).unwrap();

        assert_eq!(rec.subject.id.as_str(), "physics");
        assert_eq!(rec.rule, RecommendationRule::Progression);
    }

    #[test]
    fn empty_subjects_recommend_nothing() {
        assert!(recommend(&[], &[], &RecommendationPolicy::default()).is_none());
    }

    #[test]
    fn recommend_for_is_deterministic() {
        let subjects = four_subjects();
        let lessons = vec![
            lesson("calc-1", "calculus"),
            lesson("calc-2", "calculus"),
            lesson("prog-1", "programming"),
            lesson("prog-2", "programming"),
        ];
        let user = user_with(&["calc-1", "prog-1"], &[("calc-1", 85), ("prog-1", 78)]);
        let policy = RecommendationPolicy::default();

        let first = recommend_for(&user, &subjects, &lessons, &policy).unwrap();
        let second = recommend_for(&user, &subjects, &lessons, &policy).unwrap();

        assert!(std::ptr::eq(first.subject, second.subject));
        assert_eq!(first.rule, second.rule);
        assert_eq!(first.subject.id.as_str(), "calculus");
    }

    #[test]
    fn mastered_calculus_recommends_programming() {
        let subjects = four_subjects();
        let lessons = vec![
            lesson("calc-1", "calculus"),
            lesson("calc-2", "calculus"),
            lesson("prog-1", "programming"),
            lesson("stat-1", "statistics"),
            lesson("phys-1", "physics"),
        ];
        let user = user_with(&["calc-1", "calc-2"], &[("calc-1", 85), ("calc-2", 92)]);

        let rec = recommend_for(&user, &subjects, &lessons, &RecommendationPolicy::default())
            .unwrap();

        assert_eq!(rec.subject.id.as_str(), "programming");
        assert_eq!(rec.rule, RecommendationRule::Progression);
    }

    #[test]
    fn policy_rejects_bad_input() {
        assert!(matches!(
            RecommendationPolicy::new(0.0, 80.0, vec![]),
            Err(PolicyError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            RecommendationPolicy::new(70.0, f64::NAN, vec![]),
            Err(PolicyError::InvalidThreshold { .. })
        ));
        let dup = vec![SubjectId::new("calculus"), SubjectId::new("calculus")];
        assert_eq!(
            RecommendationPolicy::with_progression(dup),
            Err(PolicyError::DuplicateProgression(SubjectId::new("calculus")))
        );
    }
}
