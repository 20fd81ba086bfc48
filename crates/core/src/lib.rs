#![forbid(unsafe_code)]

//! Learning progress and next-subject recommendations.
//!
//! The crate is pure: it takes a [`model::User`] snapshot and the catalog,
//! and returns derived aggregates, a recommendation, or a replacement user.
//! Loading and saving are left to the caller.

pub mod achievements;
pub mod error;
pub mod model;
pub mod progress;
pub mod recommend;
pub mod time;
pub mod updater;

pub use time::Clock;

#[cfg(test)]
pub(crate) mod test_support;
