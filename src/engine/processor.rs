//! Drive one category: list objects, fetch assignments, resolve trails

use super::normalizer::normalize;
use super::resolver::resolve_membership;
use super::source::AssignmentSource;
use crate::error::{CategoryFetchError, ConfigurationError, TransportError};
use crate::models::{AssignmentTarget, Category, ConfigurationObject, Trail};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// An object whose assignments could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedObject {
    pub category: String,
    pub object_id: String,
    pub display_name: String,
    pub reason: String,
}

/// Result of a fully processed category, not yet applied to any group
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: String,
    /// One trail per tracked group, in the order the group ids were given
    pub trails: Vec<Trail>,
    pub objects: usize,
    pub skipped_objects: Vec<SkippedObject>,
    pub malformed_records: usize,
}

type FetchResult = Option<Result<Vec<JsonValue>, TransportError>>;

pub struct CategoryProcessor {
    source: Arc<dyn AssignmentSource>,
    concurrency: usize,
}

impl CategoryProcessor {
    /// `concurrency` bounds the in-flight assignment fetches; 1 is fully sequential
    pub fn new(source: Arc<dyn AssignmentSource>, concurrency: usize) -> Result<Self, ConfigurationError> {
        if concurrency == 0 {
            return Err(ConfigurationError::InvalidConcurrency);
        }
        Ok(Self {
            source,
            concurrency,
        })
    }

    #[instrument(skip_all, fields(category = %category.key))]
    pub async fn process(
        &self,
        category: &Category,
        group_ids: &[String],
    ) -> Result<CategoryOutcome, CategoryFetchError> {
        let objects = self
            .source
            .list_objects(category)
            .await
            .map_err(|source| CategoryFetchError {
                category: category.key.clone(),
                source,
            })?;
        info!("{} objects in {}", objects.len(), category.key);

        let fetched = self.fetch_assignments(category, &objects).await;

        let mut outcome = CategoryOutcome {
            category: category.key.clone(),
            trails: vec![Trail::default(); group_ids.len()],
            objects: objects.len(),
            skipped_objects: Vec::new(),
            malformed_records: 0,
        };

        for (object, result) in objects.iter().zip(fetched) {
            let records = match result {
                Some(Ok(records)) => records,
                Some(Err(e)) => {
                    warn!("skipping '{}' ({}): {}", object.display_name, object.id, e);
                    outcome.skipped_objects.push(skipped(category, object, e.to_string()));
                    continue;
                }
                None => {
                    warn!("skipping '{}' ({}): assignment fetch did not complete", object.display_name, object.id);
                    outcome
                        .skipped_objects
                        .push(skipped(category, object, "assignment fetch did not complete".into()));
                    continue;
                }
            };

            let targets = normalize_all(category, object, &records, &mut outcome.malformed_records);
            debug!("'{}' has {} targets", object.display_name, targets.len());

            for (group_id, trail) in group_ids.iter().zip(outcome.trails.iter_mut()) {
                resolve_membership(group_id, &object.display_name, &targets, trail);
            }
        }

        Ok(outcome)
    }

    /// Fetch every object's assignments on a bounded pool. Results come back
    /// indexed like `objects`, whatever order the fetches finish in.
    async fn fetch_assignments(&self, category: &Category, objects: &[ConfigurationObject]) -> Vec<FetchResult> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, object) in objects.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let category = category.clone();
            let object_id = object.id.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = source.list_assignments(&category, &object_id).await;
                (index, result)
            });
        }

        let mut results: Vec<FetchResult> = objects.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!("assignment fetch task failed: {}", e),
            }
        }

        results
    }
}

fn normalize_all(
    category: &Category,
    object: &ConfigurationObject,
    records: &[JsonValue],
    malformed: &mut usize,
) -> Vec<AssignmentTarget> {
    records
        .iter()
        .filter_map(|record| match normalize(record, category.schema) {
            Ok(target) => Some(target),
            Err(e) => {
                warn!(
                    "ignoring malformed assignment of '{}' in {}: {}",
                    object.display_name, category.key, e
                );
                *malformed += 1;
                None
            }
        })
        .collect()
}

fn skipped(category: &Category, object: &ConfigurationObject, reason: String) -> SkippedObject {
    SkippedObject {
        category: category.key.clone(),
        object_id: object.id.clone(),
        display_name: object.display_name.clone(),
        reason,
    }
}
