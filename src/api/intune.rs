//! Intune configuration objects and their assignments

use super::GraphClient;
use crate::engine::AssignmentSource;
use crate::error::TransportError;
use crate::models::{Category, ConfigurationObject, RawConfigurationObject};
use async_trait::async_trait;
use serde_json::Value as JsonValue;

#[async_trait]
impl AssignmentSource for GraphClient {
    async fn list_objects(&self, category: &Category) -> Result<Vec<ConfigurationObject>, TransportError> {
        let raw: Vec<RawConfigurationObject> = self.get_all(&category.collection_path()).await?;
        Ok(raw
            .into_iter()
            .map(|r| ConfigurationObject::from_raw(r, category.name_field))
            .collect())
    }

    async fn list_assignments(
        &self,
        category: &Category,
        object_id: &str,
    ) -> Result<Vec<JsonValue>, TransportError> {
        self.get_all(&category.assignments_path(object_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use crate::models::CategoryTable;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn category(key: &str) -> Category {
        CategoryTable::builtin()
            .categories()
            .iter()
            .find(|c| c.key == key)
            .cloned()
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_settings_catalog_policies_by_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/deviceManagement/configurationPolicies"))
            .and(query_param("$select", "id,name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": "cp1", "name": "Edge baseline"},
                    {"id": "cp2", "name": "Defender"}
                ]
            })))
            .mount(&server)
            .await;

        let client = GraphClient::new(Arc::new(StaticToken::new("t")), &server.uri(), "beta").unwrap();
        let objects = client
            .list_objects(&category("configurationPolicies"))
            .await
            .unwrap();

        assert_eq!(
            objects,
            vec![
                ConfigurationObject::new("cp1", "Edge baseline"),
                ConfigurationObject::new("cp2", "Defender"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_group_assignments() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/beta/deviceManagement/deviceManagementScripts/s1/groupAssignments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "ga1", "targetGroupId": "g1", "excludeGroup": false}]
            })))
            .mount(&server)
            .await;

        let client = GraphClient::new(Arc::new(StaticToken::new("t")), &server.uri(), "beta").unwrap();
        let records = client
            .list_assignments(&category("platformScripts"), "s1")
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["targetGroupId"], "g1");
    }
}
