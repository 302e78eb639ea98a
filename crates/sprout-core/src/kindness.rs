//! Kindness moment records
//!
//! Kindness moments are append-only: created by user action, stamped
//! with an id at creation time, and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stamp_id;

/// A recorded kindness moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindnessMoment {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: String,
    pub points: u32,
    pub verified: bool,
}

/// A kindness moment before it has been stamped with an id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKindnessMoment {
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub category: String,
    pub points: u32,
    #[serde(default)]
    pub verified: bool,
}

impl NewKindnessMoment {
    /// Stamp this moment with a fresh unique id.
    pub fn into_moment(self) -> KindnessMoment {
        KindnessMoment {
            id: stamp_id("kindness"),
            user_id: self.user_id,
            date: self.date,
            description: self.description,
            category: self.category,
            points: self.points,
            verified: self.verified,
        }
    }
}
