use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("quiz score must be between 0 and 100, got {0}")]
    OutOfRange(u32),
}

//
// ─── QUIZ SCORE ───────────────────────────────────────────────────────────────
//

/// A quiz result as an integer percentage in `0..=100`.
///
/// Construction is the only validation point; every `QuizScore` in the system
/// is known to be in range, so point awards can never overflow the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuizScore(u8);

impl QuizScore {
    pub const MAX: u8 = 100;

    /// Validates a raw percentage.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::OutOfRange` if the value exceeds 100.
    pub fn new(value: u32) -> Result<Self, ScoreError> {
        match u8::try_from(value) {
            Ok(pct) if pct <= Self::MAX => Ok(Self(pct)),
            _ => Err(ScoreError::OutOfRange(value)),
        }
    }

    /// Builds a score from `correct` answers out of `total` questions,
    /// rounded to the nearest whole percent.
    ///
    /// A quiz with no questions scores 0.
    #[must_use]
    pub fn from_ratio(correct: usize, total: usize) -> Self {
        if total == 0 {
            return Self(0);
        }
        let correct = correct.min(total);
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = ((correct as f64 / total as f64) * 100.0).round() as u8;
        Self(pct.min(Self::MAX))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Points earned for submitting a quiz with this score (10 per percent).
    #[must_use]
    pub fn points(self) -> u64 {
        u64::from(self.0) * 10
    }

    #[must_use]
    pub fn band(self) -> ScoreBand {
        ScoreBand::for_score(self)
    }
}

impl TryFrom<u32> for QuizScore {
    type Error = ScoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuizScore> for u32 {
    fn from(score: QuizScore) -> Self {
        u32::from(score.0)
    }
}

impl std::fmt::Display for QuizScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── FEEDBACK ─────────────────────────────────────────────────────────────────
//

/// Display classification of a quiz result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// 90 and above.
    Excellent,
    /// 80–89.
    Great,
    /// 70–79.
    GoodEffort,
    /// 60–69.
    KeepPracticing,
    /// Below 60.
    NeedsReview,
}

/// Colour family the presenter should use for a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTone {
    Success,
    Warning,
    Danger,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: QuizScore) -> Self {
        match score.value() {
            90.. => Self::Excellent,
            80..=89 => Self::Great,
            70..=79 => Self::GoodEffort,
            60..=69 => Self::KeepPracticing,
            _ => Self::NeedsReview,
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent work!",
            Self::Great => "Great job!",
            Self::GoodEffort => "Good effort!",
            Self::KeepPracticing => "Keep practicing!",
            Self::NeedsReview => "Need more review",
        }
    }

    #[must_use]
    pub fn tone(self) -> ScoreTone {
        match self {
            Self::Excellent | Self::Great => ScoreTone::Success,
            Self::GoodEffort | Self::KeepPracticing => ScoreTone::Warning,
            Self::NeedsReview => ScoreTone::Danger,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
