//! Family group types

use serde::{Deserialize, Serialize};

/// A family member's role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Parent,
    Guardian,
    Child,
    Grandparent,
    Sibling,
}

/// A member of a family group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    pub role: FamilyRole,
    pub avatar: String,
}

/// A family group shared by related users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<FamilyMember>,
}
