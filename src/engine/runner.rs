//! Whole-run orchestration: resolve groups, process every category, summarize

use super::processor::{CategoryProcessor, SkippedObject};
use super::source::GroupDirectory;
use crate::error::TransportError;
use crate::models::{CategoryTable, Group};
use std::future::Future;
use tracing::{info, warn};

/// A category that produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCategory {
    pub category: String,
    pub reason: String,
}

/// What happened during a run, for the closing report
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub processed_categories: Vec<String>,
    pub skipped_categories: Vec<SkippedCategory>,
    pub skipped_objects: Vec<SkippedObject>,
    pub malformed_records: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.skipped_categories.is_empty()
            && self.skipped_objects.is_empty()
            && self.malformed_records == 0
            && !self.cancelled
    }
}

/// Resolve group names into tracked groups.
///
/// Returns the groups (deduplicated by id, in the order given) and the names
/// that matched nothing.
pub async fn track_groups(
    directory: &dyn GroupDirectory,
    names: &[String],
) -> Result<(Vec<Group>, Vec<String>), TransportError> {
    let mut groups: Vec<Group> = Vec::new();
    let mut unresolved = Vec::new();

    for name in names {
        match directory.resolve_group(name).await? {
            Some(identity) => {
                if groups.iter().any(|g| g.id() == identity.id) {
                    continue;
                }
                if identity.is_pseudo_group() {
                    info!("tracking built-in target '{}'", identity.display_name);
                } else {
                    info!("tracking '{}' ({})", identity.display_name, identity.id);
                }
                groups.push(Group::new(identity));
            }
            None => {
                warn!("group '{}' not found", name);
                unresolved.push(name.clone());
            }
        }
    }

    Ok((groups, unresolved))
}

pub struct Runner {
    processor: CategoryProcessor,
    table: CategoryTable,
}

impl Runner {
    pub fn new(processor: CategoryProcessor, table: CategoryTable) -> Self {
        Self { processor, table }
    }

    /// Process every category in table order and commit each finished one to
    /// `groups`.
    ///
    /// When `cancel` completes the category in flight is dropped along with
    /// its pending fetches; it and the remaining categories are reported as
    /// skipped and no trail is written for them.
    pub async fn run<F>(&self, groups: &mut [Group], cancel: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let group_ids: Vec<String> = groups.iter().map(|g| g.id().to_string()).collect();
        let mut summary = RunSummary::default();
        let categories = self.table.categories();

        for (position, category) in categories.iter().enumerate() {
            let result = tokio::select! {
                biased;
                _ = &mut cancel => None,
                result = self.processor.process(category, &group_ids) => Some(result),
            };

            match result {
                None => {
                    warn!("run cancelled during {}", category.key);
                    summary.cancelled = true;
                    summary.skipped_categories.extend(categories[position..].iter().map(|c| {
                        SkippedCategory {
                            category: c.key.clone(),
                            reason: "cancelled".to_string(),
                        }
                    }));
                    break;
                }
                Some(Err(e)) => {
                    warn!("skipping {}: {}", category.key, e.source);
                    summary.skipped_categories.push(SkippedCategory {
                        category: category.key.clone(),
                        reason: e.source.to_string(),
                    });
                }
                Some(Ok(outcome)) => {
                    info!(
                        "{}: {} objects, {} skipped",
                        category.key,
                        outcome.objects,
                        outcome.skipped_objects.len()
                    );
                    for (group, trail) in groups.iter_mut().zip(outcome.trails) {
                        group.record_category(&outcome.category, trail);
                    }
                    summary.processed_categories.push(outcome.category);
                    summary.skipped_objects.extend(outcome.skipped_objects);
                    summary.malformed_records += outcome.malformed_records;
                }
            }
        }

        summary
    }
}
