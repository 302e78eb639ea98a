//! Activity catalog and completion results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An activity from the remote catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub difficulty: String,
    pub estimated_duration: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The result of a completed activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub activity_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
