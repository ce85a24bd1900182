//! Bulk Mutation Executor
//!
//! Applies N independent update or delete instructions and reports a single
//! partitioned outcome. Instructions never abort or roll back one another;
//! there is no transactional grouping. Both paths run as bounded-concurrency
//! fire-and-collect, with outcomes re-ordered to the input order before
//! partitioning so reports stay deterministic.

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::collection::Document;
use super::engine::DocumentStore;

/// Instructions held in flight at once per bulk request.
const MAX_IN_FLIGHT: usize = 8;

/// One `{id, updateData}` instruction of a bulk update request.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdate {
    pub id: String,
    #[serde(rename = "updateData")]
    pub update_data: JsonMap<String, JsonValue>,
}

/// Three-way aggregate result every bulk caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkClassification {
    /// Every instruction succeeded (HTTP 200).
    AllSucceeded,
    /// At least one success and at least one failure (HTTP 207).
    PartialSuccess,
    /// No instruction succeeded (HTTP 400).
    AllFailed,
}

/// Partitioned bulk report. Every input id lands in exactly one partition,
/// in input order.
#[derive(Debug)]
pub struct BulkOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed_ids: Vec<String>,
}

impl<T> BulkOutcome<T> {
    pub fn classification(&self) -> BulkClassification {
        if self.failed_ids.is_empty() {
            BulkClassification::AllSucceeded
        } else if self.succeeded.is_empty() {
            BulkClassification::AllFailed
        } else {
            BulkClassification::PartialSuccess
        }
    }

    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Applies every `{id, updateData}` instruction independently. Not-found and
/// validation/constraint failures both classify the instruction as failed.
pub async fn bulk_update(
    store: &DocumentStore,
    resource: &str,
    instructions: Vec<BulkUpdate>,
) -> BulkOutcome<Document> {
    let mut results: Vec<(usize, String, Option<Document>)> =
        stream::iter(instructions.into_iter().enumerate().map(
            |(index, instruction)| async move {
                let BulkUpdate { id, update_data } = instruction;
                let outcome = store.update(resource, &id, update_data).await;
                if let Err(err) = &outcome {
                    tracing::debug!(%id, error = %err, "bulk update instruction failed");
                }
                (index, id, outcome.ok())
            },
        ))
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;

    results.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BulkOutcome {
        succeeded: Vec::new(),
        failed_ids: Vec::new(),
    };
    for (_, id, result) in results {
        match result {
            Some(doc) => outcome.succeeded.push(doc),
            None => outcome.failed_ids.push(id),
        }
    }
    outcome
}

/// Deletes every id independently. A missing id classifies as failed and
/// never disturbs its siblings.
pub async fn bulk_delete(
    store: &DocumentStore,
    resource: &str,
    ids: Vec<String>,
) -> BulkOutcome<String> {
    let mut results: Vec<(usize, String, bool)> =
        stream::iter(ids.into_iter().enumerate().map(|(index, id)| async move {
            let removed = store.remove(resource, &id).await.unwrap_or(false);
            (index, id, removed)
        }))
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;

    results.sort_by_key(|(index, _, _)| *index);

    let mut outcome = BulkOutcome {
        succeeded: Vec::new(),
        failed_ids: Vec::new(),
    };
    for (_, id, removed) in results {
        if removed {
            outcome.succeeded.push(id);
        } else {
            outcome.failed_ids.push(id);
        }
    }
    outcome
}
