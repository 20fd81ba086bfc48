//! Persistence adapters and catalog loading for the tutor.
//!
//! User state is stored as one JSON blob per user, either in memory or in a
//! `SQLite` key-value table.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod sqlite;
