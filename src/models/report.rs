//! Consolidated report: one row per tracked group

use super::group::Group;

/// Tabular report handed to the exporter
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Category keys, one column each after the identity columns
    pub categories: Vec<String>,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub id: String,
    pub display_name: String,
    pub created_date_time: Option<String>,
    /// Rendered trail per category; `None` when the category was skipped
    pub trails: Vec<Option<String>>,
}

impl Report {
    pub const IDENTITY_COLUMNS: [&'static str; 3] = ["id", "displayName", "createdDateTime"];

    pub fn assemble(groups: &[Group], categories: &[String]) -> Self {
        let rows = groups
            .iter()
            .map(|group| ReportRow {
                id: group.identity.id.clone(),
                display_name: group.identity.display_name.clone(),
                created_date_time: group.identity.created_date_time.map(|dt| dt.to_rfc3339()),
                trails: categories
                    .iter()
                    .map(|c| group.trail(c).map(|t| t.to_string()))
                    .collect(),
            })
            .collect();

        Self {
            categories: categories.to_vec(),
            rows,
        }
    }

    /// Header row: identity columns followed by category keys
    pub fn columns(&self) -> Vec<String> {
        Self::IDENTITY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.categories.iter().cloned())
            .collect()
    }
}

impl ReportRow {
    /// Cell values in column order, empty strings for missing values
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.id.clone(),
            self.display_name.clone(),
            self.created_date_time.clone().unwrap_or_default(),
        ];
        cells.extend(self.trails.iter().map(|t| t.clone().unwrap_or_default()));
        cells
    }
}
