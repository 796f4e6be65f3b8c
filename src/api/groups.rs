//! Directory group lookup

use super::GraphClient;
use crate::engine::GroupDirectory;
use crate::error::TransportError;
use crate::models::GroupIdentity;
use async_trait::async_trait;
use tracing::warn;

impl GraphClient {
    /// Find groups whose display name matches exactly
    pub async fn find_groups_by_name(&self, name: &str) -> Result<Vec<GroupIdentity>, TransportError> {
        let endpoint = format!(
            "groups?$filter={}&$select=id,displayName,createdDateTime",
            urlencoding::encode(&display_name_filter(name))
        );
        self.get_all(&endpoint).await
    }
}

#[async_trait]
impl GroupDirectory for GraphClient {
    async fn resolve_group(&self, name: &str) -> Result<Option<GroupIdentity>, TransportError> {
        if let Some(pseudo) = GroupIdentity::well_known(name) {
            return Ok(Some(pseudo));
        }

        let mut matches = self.find_groups_by_name(name.trim()).await?;
        if matches.len() > 1 {
            warn!(
                "{} groups are named '{}', using {}",
                matches.len(),
                name,
                matches[0].id
            );
        }

        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }
}

/// OData equality filter on displayName, single quotes doubled
fn display_name_filter(name: &str) -> String {
    format!("displayName eq '{}'", name.replace('\'', "''"))
}
