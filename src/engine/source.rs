//! Collaborators the engine talks to

use crate::error::TransportError;
use crate::models::{Category, ConfigurationObject, GroupIdentity};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

/// Where configuration objects and their assignments come from.
///
/// Implementations must drain pagination themselves and return items in the
/// order the service listed them.
#[async_trait]
pub trait AssignmentSource: Send + Sync {
    async fn list_objects(&self, category: &Category) -> Result<Vec<ConfigurationObject>, TransportError>;

    /// Raw assignment records; their shape depends on `category.schema`
    async fn list_assignments(
        &self,
        category: &Category,
        object_id: &str,
    ) -> Result<Vec<JsonValue>, TransportError>;
}

/// Name -> group lookup. Reserved names resolve to the pseudo-groups.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn resolve_group(&self, name: &str) -> Result<Option<GroupIdentity>, TransportError>;
}
