//! User progress aggregates
//!
//! Progress is a single aggregate object mutated by whole-object
//! replace-and-persist. Concurrent partial updates must be composed by
//! the caller before writing; there is no field-level merge on the
//! remote side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A weekly goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub target: u32,
    pub current: u32,
    pub completed: bool,
}

/// A monthly milestone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub description: String,
    pub achieved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_achieved: Option<DateTime<Utc>>,
}

/// Aggregate progress counters plus goal/milestone lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_activities_completed: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub kindness_points: u32,
    pub creativity_score: u32,
    pub emotional_intelligence_level: u32,
    #[serde(default)]
    pub weekly_goals: Vec<Goal>,
    #[serde(default)]
    pub monthly_milestones: Vec<Milestone>,
}

impl UserProgress {
    /// The progress a brand-new user starts with.
    pub fn initial() -> Self {
        Self {
            total_activities_completed: 0,
            current_streak: 0,
            longest_streak: 0,
            kindness_points: 0,
            creativity_score: 0,
            emotional_intelligence_level: 1,
            weekly_goals: Vec::new(),
            monthly_milestones: vec![Milestone {
                id: "1".to_string(),
                title: "First Steps".to_string(),
                description: "Complete your first activity".to_string(),
                achieved: false,
                date_achieved: None,
            }],
        }
    }

    /// Merge a partial update, returning the new full aggregate.
    pub fn apply(&self, update: ProgressUpdate) -> UserProgress {
        let mut next = self.clone();
        if let Some(v) = update.total_activities_completed {
            next.total_activities_completed = v;
        }
        if let Some(v) = update.current_streak {
            next.current_streak = v;
        }
        if let Some(v) = update.longest_streak {
            next.longest_streak = v;
        }
        if let Some(v) = update.kindness_points {
            next.kindness_points = v;
        }
        if let Some(v) = update.creativity_score {
            next.creativity_score = v;
        }
        if let Some(v) = update.emotional_intelligence_level {
            next.emotional_intelligence_level = v;
        }
        if let Some(v) = update.weekly_goals {
            next.weekly_goals = v;
        }
        if let Some(v) = update.monthly_milestones {
            next.monthly_milestones = v;
        }
        next
    }
}

impl Default for UserProgress {
    fn default() -> Self {
        Self::initial()
    }
}

/// A partial progress update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_activities_completed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kindness_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creativity_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_intelligence_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_goals: Option<Vec<Goal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_milestones: Option<Vec<Milestone>>,
}
