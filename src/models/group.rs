//! Group model

use serde::{Deserialize, Serialize};

use super::string_or_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub participants: u64,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub restrict: bool,
    #[serde(default)]
    pub announce: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

/// Settings pushed to the gateway for one group
///
/// `restrict` limits settings edits to admins, `announce` limits sending to admins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    pub restrict: bool,
    pub announce: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStatistics {
    pub total: usize,
    pub admin_groups: usize,
    pub member_groups: usize,
}

impl GroupSettings {
    /// Current settings of a group, used as the starting point of an edit
    pub fn from_group(group: &Group) -> Self {
        Self {
            restrict: group.restrict,
            announce: group.announce,
            description: Some(group.description.clone().unwrap_or_default()),
            name: Some(group.name.clone()),
        }
    }
}
