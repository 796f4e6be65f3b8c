//! Configuration objects (policies, profiles, scripts, apps, ...)

use super::category::NameField;
use serde::Deserialize;

/// Listing record as it comes off the wire. Depending on the category the
/// readable name is in `displayName` or `name`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigurationObject {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "displayName")]
    pub display_name: Option<String>,

    #[serde(rename = "name")]
    pub name: Option<String>,
}

/// One manageable unit within a category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationObject {
    pub id: String,
    pub display_name: String,
}

impl ConfigurationObject {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Apply the category's name-field rule, falling back to the id
    pub fn from_raw(raw: RawConfigurationObject, name_field: NameField) -> Self {
        let name = match name_field {
            NameField::DisplayName => raw.display_name,
            NameField::Name => raw.name,
        };

        let display_name = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name,
            None => {
                tracing::debug!(id = %raw.id, field = name_field.wire_name(), "object has no name, using id");
                raw.id.clone()
            }
        };

        Self::new(raw.id, display_name)
    }
}
