//! In-memory collaborators for engine tests

use super::source::{AssignmentSource, GroupDirectory};
use crate::error::TransportError;
use crate::models::{Category, ConfigurationObject, GroupIdentity};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

fn unavailable() -> TransportError {
    TransportError::Api {
        status: 503,
        code: "ServiceUnavailable".into(),
        message: "try again later".into(),
    }
}

#[derive(Default)]
pub struct FakeSource {
    objects: HashMap<String, Vec<ConfigurationObject>>,
    assignments: HashMap<String, Vec<JsonValue>>,
    failing_categories: HashSet<String>,
    hanging_categories: HashSet<String>,
    failing_objects: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(mut self, category: &str, objects: Vec<ConfigurationObject>) -> Self {
        self.objects.insert(category.to_string(), objects);
        self
    }

    pub fn with_assignments(mut self, object_id: &str, records: Vec<JsonValue>) -> Self {
        self.assignments.insert(object_id.to_string(), records);
        self
    }

    pub fn with_failing_category(mut self, category: &str) -> Self {
        self.failing_categories.insert(category.to_string());
        self
    }

    /// Listing this category never returns
    pub fn with_hanging_category(mut self, category: &str) -> Self {
        self.hanging_categories.insert(category.to_string());
        self
    }

    pub fn with_failing_assignments(mut self, object_id: &str) -> Self {
        self.failing_objects.insert(object_id.to_string());
        self
    }

    pub fn with_delay(mut self, object_id: &str, delay: Duration) -> Self {
        self.delays.insert(object_id.to_string(), delay);
        self
    }
}

#[async_trait]
impl AssignmentSource for FakeSource {
    async fn list_objects(&self, category: &Category) -> Result<Vec<ConfigurationObject>, TransportError> {
        if self.hanging_categories.contains(&category.key) {
            std::future::pending::<()>().await;
        }
        if self.failing_categories.contains(&category.key) {
            return Err(unavailable());
        }
        Ok(self.objects.get(&category.key).cloned().unwrap_or_default())
    }

    async fn list_assignments(
        &self,
        _category: &Category,
        object_id: &str,
    ) -> Result<Vec<JsonValue>, TransportError> {
        if let Some(delay) = self.delays.get(object_id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_objects.contains(object_id) {
            return Err(unavailable());
        }
        Ok(self.assignments.get(object_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    groups: HashMap<String, GroupIdentity>,
}

impl FakeDirectory {
    pub fn with_group(mut self, id: &str, name: &str) -> Self {
        self.groups.insert(
            name.to_string(),
            GroupIdentity {
                id: id.to_string(),
                display_name: name.to_string(),
                created_date_time: None,
            },
        );
        self
    }
}

#[async_trait]
impl GroupDirectory for FakeDirectory {
    async fn resolve_group(&self, name: &str) -> Result<Option<GroupIdentity>, TransportError> {
        if let Some(pseudo) = GroupIdentity::well_known(name) {
            return Ok(Some(pseudo));
        }
        Ok(self.groups.get(name).cloned())
    }
}
