//! The static table of Intune configuration categories
//!
//! This is the only place that knows anything category specific; the
//! normalizer and resolver only see the schema variant and name field.

use crate::error::ConfigurationError;
use std::collections::HashSet;

/// Shape of the raw assignment records a category returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Flat `groupAssignments` records: `groupId` + `excludeGroup`
    GroupAssignments,
    /// `assignments` records with a nested, discriminated `target`
    Assignments,
}

/// Field holding an object's human readable name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    DisplayName,
    Name,
}

impl NameField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::DisplayName => "displayName",
            Self::Name => "name",
        }
    }
}

/// One configuration category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Report column / trail key
    pub key: String,
    pub service_path: String,
    pub resource_type: String,
    pub relation: String,
    pub schema: SchemaVariant,
    pub name_field: NameField,
}

impl Category {
    fn new(
        key: &str,
        service_path: &str,
        resource_type: &str,
        relation: &str,
        schema: SchemaVariant,
        name_field: NameField,
    ) -> Self {
        Self {
            key: key.to_string(),
            service_path: service_path.to_string(),
            resource_type: resource_type.to_string(),
            relation: relation.to_string(),
            schema,
            name_field,
        }
    }

    /// Collection endpoint relative to the Graph base URL
    pub fn collection_path(&self) -> String {
        format!(
            "{}/{}?$select=id,{}",
            self.service_path,
            self.resource_type,
            self.name_field.wire_name()
        )
    }

    /// Assignment endpoint for one object
    pub fn assignments_path(&self, object_id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.service_path,
            self.resource_type,
            urlencoding::encode(object_id),
            self.relation
        )
    }
}

/// Ordered list of categories processed in one run
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// The ten categories covered by the report, in report column order
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        use NameField::*;
        use SchemaVariant::*;

        Self {
            categories: vec![
                Category::new("configurationPolicies", "deviceManagement", "configurationPolicies", "assignments", Assignments, Name),
                Category::new("deviceConfigurations", "deviceManagement", "deviceConfigurations", "groupAssignments", GroupAssignments, DisplayName),
                Category::new("administrativeTemplates", "deviceManagement", "groupPolicyConfigurations", "assignments", Assignments, DisplayName),
                Category::new("compliancePolicies", "deviceManagement", "deviceCompliancePolicies", "assignments", Assignments, DisplayName),
                Category::new("apps", "deviceAppManagement", "mobileApps", "assignments", Assignments, DisplayName),
                Category::new("platformScripts", "deviceManagement", "deviceManagementScripts", "groupAssignments", GroupAssignments, DisplayName),
                Category::new("remediationScripts", "deviceManagement", "deviceHealthScripts", "assignments", Assignments, DisplayName),
                Category::new("autopilotProfiles", "deviceManagement", "windowsAutopilotDeploymentProfiles", "assignments", Assignments, DisplayName),
                Category::new("enrollmentConfigurations", "deviceManagement", "deviceEnrollmentConfigurations", "assignments", Assignments, DisplayName),
                Category::new("intents", "deviceManagement", "intents", "assignments", Assignments, DisplayName),
            ],
        }
    }

    #[cfg(test)]
    pub fn from_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn keys(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.key.clone()).collect()
    }

    /// Check every descriptor before anything is fetched
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.categories.is_empty() {
            return Err(ConfigurationError::EmptyTable);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            let fields = [
                ("key", &category.key),
                ("service path", &category.service_path),
                ("resource type", &category.resource_type),
                ("relation", &category.relation),
            ];
            for (field, value) in fields {
                if value.trim().is_empty() {
                    return Err(ConfigurationError::EmptyField {
                        key: category.key.clone(),
                        field,
                    });
                }
            }

            // service path may be nested, the other segments may not
            let segments = [
                ("service path", &category.service_path, true),
                ("resource type", &category.resource_type, false),
                ("relation", &category.relation, false),
            ];
            for (field, value, nested) in segments {
                let bad = value.contains('?')
                    || value.starts_with('/')
                    || value.ends_with('/')
                    || (!nested && value.contains('/'));
                if bad {
                    return Err(ConfigurationError::InvalidSegment {
                        key: category.key.clone(),
                        field,
                        value: value.clone(),
                    });
                }
            }

            if !seen.insert(category.key.as_str()) {
                return Err(ConfigurationError::DuplicateCategory(category.key.clone()));
            }
        }

        Ok(())
    }

    /// Keep only the requested keys, preserving table order.
    /// An empty selection keeps everything.
    pub fn select(self, keys: &[String]) -> Result<Self, ConfigurationError> {
        if keys.is_empty() {
            return Ok(self);
        }

        for key in keys {
            if !self.categories.iter().any(|c| c.key.eq_ignore_ascii_case(key)) {
                return Err(ConfigurationError::UnknownCategory(key.clone()));
            }
        }

        let categories = self
            .categories
            .into_iter()
            .filter(|c| keys.iter().any(|k| c.key.eq_ignore_ascii_case(k)))
            .collect();

        Ok(Self { categories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = CategoryTable::builtin();
        assert_eq!(table.categories().len(), 10);
        assert_eq!(table.validate(), Ok(()));
        assert_eq!(table.keys()[3], "compliancePolicies");
    }

    #[test]
    fn test_builtin_schema_variants() {
        let table = CategoryTable::builtin();
        let scripts = table
            .categories()
            .iter()
            .find(|c| c.key == "platformScripts")
            .unwrap();
        assert_eq!(scripts.schema, SchemaVariant::GroupAssignments);
        assert_eq!(scripts.relation, "groupAssignments");

        let settings = &table.categories()[0];
        assert_eq!(settings.name_field, NameField::Name);
        assert_eq!(settings.schema, SchemaVariant::Assignments);
    }

    #[test]
    fn test_paths() {
        let table = CategoryTable::builtin();
        let apps = table.categories().iter().find(|c| c.key == "apps").unwrap();
        assert_eq!(
            apps.collection_path(),
            "deviceAppManagement/mobileApps?$select=id,displayName"
        );
        assert_eq!(
            apps.assignments_path("1234"),
            "deviceAppManagement/mobileApps/1234/assignments"
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut categories = CategoryTable::builtin().categories().to_vec();
        categories.push(categories[0].clone());
        let table = CategoryTable::from_categories(categories);
        assert_eq!(
            table.validate(),
            Err(ConfigurationError::DuplicateCategory("configurationPolicies".into()))
        );
    }

    #[test]
    fn test_empty_and_malformed_descriptors_rejected() {
        assert_eq!(
            CategoryTable::from_categories(vec![]).validate(),
            Err(ConfigurationError::EmptyTable)
        );

        let mut category = CategoryTable::builtin().categories()[0].clone();
        category.relation = " ".into();
        assert!(matches!(
            CategoryTable::from_categories(vec![category]).validate(),
            Err(ConfigurationError::EmptyField { field: "relation", .. })
        ));

        let mut category = CategoryTable::builtin().categories()[0].clone();
        category.resource_type = "intents/extra".into();
        assert!(matches!(
            CategoryTable::from_categories(vec![category]).validate(),
            Err(ConfigurationError::InvalidSegment { field: "resource type", .. })
        ));
    }

    #[test]
    fn test_select_preserves_table_order() {
        let table = CategoryTable::builtin()
            .select(&["intents".into(), "Apps".into()])
            .unwrap();
        assert_eq!(table.keys(), vec!["apps", "intents"]);
    }

    #[test]
    fn test_select_unknown_key() {
        let err = CategoryTable::builtin()
            .select(&["scopeTags".into()])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownCategory("scopeTags".into()));
    }
}
