//! # Sprout Core
//!
//! Core domain types for the Sprout offline-first data engine.
//!
//! This crate defines the data model shared by the storage, gateway and
//! sync crates:
//!
//! - **Profile types**: the user profile and partial-update merging
//! - **Progress types**: aggregate counters, goals and milestones
//! - **Kindness / storybook types**: append-only, id-stamped records
//! - **Activity types**: the activity catalog and completion results
//! - **ApiResponse**: the uniform response envelope used by every remote
//!   endpoint
//!
//! All types serialize to camelCase JSON, matching the wire format the
//! backend speaks.

pub mod activity;
pub mod api;
pub mod family;
pub mod kindness;
pub mod profile;
pub mod progress;
pub mod storybook;

// Re-exports
pub use activity::{Activity, ActivityResult};
pub use api::ApiResponse;
pub use family::{FamilyGroup, FamilyMember, FamilyRole};
pub use kindness::{KindnessMoment, NewKindnessMoment};
pub use profile::{AgeGroup, Difficulty, LearningStyle, Preferences, Profile, ProfileUpdate};
pub use progress::{Goal, Milestone, ProgressUpdate, UserProgress};
pub use storybook::{EntryKind, NewStorybookEntry, StorybookEntry};

use chrono::Utc;

/// Generate a unique, monotonic-ish record id with the given prefix.
///
/// Ids embed the creation time in epoch milliseconds so that
/// lexicographic order within one prefix approximates creation order,
/// followed by a random suffix for uniqueness.
pub fn stamp_id(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}
