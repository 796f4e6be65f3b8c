//! Tracked groups and their per-category membership trails

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved id Intune uses for the "All users" (all licensed users) target
pub const ALL_USERS_ID: &str = "acacacac-9df4-4c7d-9d50-4ef0226f57a9";

/// Reserved id Intune uses for the "All devices" target
pub const ALL_DEVICES_ID: &str = "adadadad-808e-44e2-905a-0b7873a8a531";

pub const ALL_USERS_NAME: &str = "All users";
pub const ALL_DEVICES_NAME: &str = "All devices";

/// Identity of a group as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupIdentity {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "displayName")]
    pub display_name: String,

    #[serde(rename = "createdDateTime")]
    pub created_date_time: Option<DateTime<Utc>>,
}

impl GroupIdentity {
    pub fn all_users() -> Self {
        Self {
            id: ALL_USERS_ID.to_string(),
            display_name: ALL_USERS_NAME.to_string(),
            created_date_time: None,
        }
    }

    pub fn all_devices() -> Self {
        Self {
            id: ALL_DEVICES_ID.to_string(),
            display_name: ALL_DEVICES_NAME.to_string(),
            created_date_time: None,
        }
    }

    /// Map a reserved name ("All users", "All devices") to its pseudo-group
    pub fn well_known(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(ALL_USERS_NAME) {
            Some(Self::all_users())
        } else if name.eq_ignore_ascii_case(ALL_DEVICES_NAME) {
            Some(Self::all_devices())
        } else {
            None
        }
    }

    pub fn is_pseudo_group(&self) -> bool {
        self.id == ALL_USERS_ID || self.id == ALL_DEVICES_ID
    }
}

/// Whether a trail entry includes or excludes the group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Include,
    Exclude,
}

impl Sign {
    fn symbol(self) -> char {
        match self {
            Self::Include => '+',
            Self::Exclude => '-',
        }
    }
}

/// One matching assignment rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailEntry {
    pub sign: Sign,
    pub name: String,
}

impl fmt::Display for TrailEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {};", self.sign.symbol(), self.name)
    }
}

/// Ordered audit log of every rule that matched a group within one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trail {
    entries: Vec<TrailEntry>,
}

impl Trail {
    pub fn push(&mut self, sign: Sign, name: impl Into<String>) {
        self.entries.push(TrailEntry {
            sign,
            name: name.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Rendered as `+ A;- B;` (entries concatenated, no separator)
impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// A tracked group with the trails collected so far
#[derive(Debug, Clone)]
pub struct Group {
    pub identity: GroupIdentity,
    trails: BTreeMap<String, Trail>,
}

impl Group {
    pub fn new(identity: GroupIdentity) -> Self {
        Self {
            identity,
            trails: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }

    /// Store the finished trail of one category, replacing any previous one
    pub fn record_category(&mut self, category: impl Into<String>, trail: Trail) {
        self.trails.insert(category.into(), trail);
    }

    /// `None` when the category was never processed (skipped or cancelled)
    pub fn trail(&self, category: &str) -> Option<&Trail> {
        self.trails.get(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_rendering() {
        let mut trail = Trail::default();
        assert_eq!(trail.to_string(), "");

        trail.push(Sign::Include, "Baseline A");
        assert_eq!(trail.to_string(), "+ Baseline A;");

        trail.push(Sign::Exclude, "Baseline B");
        assert_eq!(trail.to_string(), "+ Baseline A;- Baseline B;");
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_well_known_names() {
        assert_eq!(GroupIdentity::well_known("all users").unwrap().id, ALL_USERS_ID);
        assert_eq!(GroupIdentity::well_known(" All Devices ").unwrap().id, ALL_DEVICES_ID);
        assert!(GroupIdentity::well_known("All staff").is_none());
        assert!(GroupIdentity::all_devices().is_pseudo_group());
    }

    #[test]
    fn test_group_identity_deserialization() {
        let json = r#"{
            "id": "0f1e2d3c-0000-4000-8000-000000000001",
            "displayName": "Pilot Devices",
            "createdDateTime": "2023-04-01T08:30:00Z"
        }"#;

        let identity: GroupIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.display_name, "Pilot Devices");
        assert!(identity.created_date_time.is_some());
        assert!(!identity.is_pseudo_group());
    }

    #[test]
    fn test_absent_versus_empty_trail() {
        let mut group = Group::new(GroupIdentity::all_users());
        assert!(group.trail("apps").is_none());

        group.record_category("apps", Trail::default());
        assert_eq!(group.trail("apps").map(|t| t.is_empty()), Some(true));
    }
}
