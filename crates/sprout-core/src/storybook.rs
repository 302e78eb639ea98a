//! Family storybook entries
//!
//! Storybook entries are append-only, id-stamped records. They are the
//! longest-lived collection the engine persists and are the target of
//! the storage-pressure trimming policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stamp_id;

/// What kind of memory a storybook entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Activity,
    Milestone,
    Memory,
    Learning,
}

/// An entry in the family storybook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorybookEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub mood: String,
}

/// A storybook entry before it has been stamped with an id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStorybookEntry {
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub mood: String,
}

impl NewStorybookEntry {
    /// Stamp this entry with a fresh unique id.
    pub fn into_entry(self) -> StorybookEntry {
        StorybookEntry {
            id: stamp_id("story"),
            date: self.date,
            title: self.title,
            description: self.description,
            kind: self.kind,
            participants: self.participants,
            tags: self.tags,
            mood: self.mood,
        }
    }
}
