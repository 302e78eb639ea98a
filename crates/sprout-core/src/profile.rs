//! User profile types
//!
//! The profile is mutated by whole-object replace: a [`ProfileUpdate`]
//! carries only the fields being changed and is merged into the current
//! profile before the result is persisted and replicated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Age bracket used for content selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Toddler,
    Preschool,
    Elementary,
    Preteen,
}

/// Preferred learning style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    Mixed,
}

/// Activity difficulty preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// User preferences attached to a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub learning_style: LearningStyle,
    pub favorite_activities: Vec<String>,
    pub difficulty: Difficulty,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            learning_style: LearningStyle::Mixed,
            favorite_activities: Vec::new(),
            difficulty: Difficulty::Easy,
        }
    }
}

/// A user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub age_group: AgeGroup,
    pub avatar: String,
    #[serde(default)]
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Merge a partial update into this profile, returning the new
    /// full profile with a refreshed `updated_at`.
    pub fn apply(&self, update: ProfileUpdate) -> Profile {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name;
        }
        if let Some(age) = update.age {
            next.age = age;
        }
        if let Some(age_group) = update.age_group {
            next.age_group = age_group;
        }
        if let Some(avatar) = update.avatar {
            next.avatar = avatar;
        }
        if let Some(preferences) = update.preferences {
            next.preferences = preferences;
        }
        next.updated_at = Utc::now();
        next
    }
}

/// A partial profile update
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}
