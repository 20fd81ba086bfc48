use crate::model::User;

/// Badges shown on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementKind {
    FirstSteps,
    QuizMaster,
    ConsistentLearner,
    PointCollector,
}

impl AchievementKind {
    pub const ALL: [AchievementKind; 4] = [
        AchievementKind::FirstSteps,
        AchievementKind::QuizMaster,
        AchievementKind::ConsistentLearner,
        AchievementKind::PointCollector,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstSteps => "First Steps",
            Self::QuizMaster => "Quiz Master",
            Self::ConsistentLearner => "Consistent Learner",
            Self::PointCollector => "Point Collector",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::FirstSteps => "Completed your first lesson",
            Self::QuizMaster => "Scored 90% or higher on a quiz",
            Self::ConsistentLearner => "Maintained a 7-day streak",
            Self::PointCollector => "Earned 1000 points",
        }
    }

    #[must_use]
    pub fn is_earned_by(self, user: &User) -> bool {
        match self {
            Self::FirstSteps => !user.completed_lessons().is_empty(),
            Self::QuizMaster => user.best_quiz_score().is_some_and(|s| s.value() >= 90),
            Self::ConsistentLearner => user.streak() >= 7,
            Self::PointCollector => user.total_points() >= 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub earned: bool,
}

/// Every achievement, in display order, with whether `user` has earned it.
#[must_use]
pub fn achievements(user: &User) -> Vec<Achievement> {
    AchievementKind::ALL
        .into_iter()
        .map(|kind| Achievement {
            kind,
            earned: kind.is_earned_by(user),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{User, UserId, UserSnapshot};
    use crate::test_support::user_with;
    use crate::time::fixed_now;

    #[test]
    fn seeded_profile_earns_everything() {
        let user = user_with(&["calc-1"], &[("calc-1", 92)]);
        assert!(achievements(&user).iter().all(|a| a.earned));
    }

    #[test]
    fn new_account_earns_nothing() {
        let user = User::from_snapshot(UserSnapshot::new(
            UserId::new("2"),
            "Sam",
            "sam@example.com",
            fixed_now(),
        ))
        .unwrap();

        let earned: Vec<_> = achievements(&user).into_iter().filter(|a| a.earned).collect();
        assert!(earned.is_empty());
    }

    #[test]
    fn quiz_master_needs_ninety() {
        let near = user_with(&["calc-1"], &[("calc-1", 89)]);
        assert!(!AchievementKind::QuizMaster.is_earned_by(&near));

        let there = user_with(&["calc-1"], &[("calc-1", 90)]);
        assert!(AchievementKind::QuizMaster.is_earned_by(&there));
    }
}
