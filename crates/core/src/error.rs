use thiserror::Error;

use crate::model::{CatalogError, QuizError, ScoreError, UserError};
use crate::recommend::PolicyError;

/// Any validation failure raised by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
