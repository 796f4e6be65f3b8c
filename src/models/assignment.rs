//! Assignment targets: the two raw Graph schemas and the canonical form

use serde::Deserialize;

pub const GROUP_TARGET: &str = "#microsoft.graph.groupAssignmentTarget";
pub const EXCLUSION_GROUP_TARGET: &str = "#microsoft.graph.exclusionGroupAssignmentTarget";
pub const ALL_LICENSED_USERS_TARGET: &str = "#microsoft.graph.allLicensedUsersAssignmentTarget";
pub const ALL_DEVICES_TARGET: &str = "#microsoft.graph.allDevicesAssignmentTarget";

/// Canonical assignment target, independent of the wire schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentTarget {
    /// Applies to the named group
    Include { group_id: String },
    /// Explicitly excludes the named group
    Exclude { group_id: String },
    /// All licensed users
    AllUsers,
    AllDevices,
    /// Any target kind we do not model (device collections, filters, ...)
    Other { odata_type: String },
}

/// `groupAssignments` record (device configurations, platform scripts)
#[derive(Debug, Clone, Deserialize)]
pub struct RawGroupAssignment {
    #[serde(rename = "groupId")]
    pub group_id: Option<String>,

    #[serde(rename = "targetGroupId")]
    pub target_group_id: Option<String>,

    #[serde(rename = "excludeGroup")]
    pub exclude_group: Option<bool>,
}

/// `assignments` record with its nested target
impl RawGroupAssignment {
    /// `groupId` when present, otherwise the older `targetGroupId` spelling
    pub fn into_group_id(self) -> Option<String> {
        self.group_id.or(self.target_group_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAssignment {
    #[serde(rename = "target")]
    pub target: Option<RawAssignmentTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAssignmentTarget {
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,

    #[serde(rename = "groupId")]
    pub group_id: Option<String>,
}
