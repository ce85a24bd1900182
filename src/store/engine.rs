//! Document store
//!
//! Holds one [`Collection`] per registry schema behind a single async
//! `RwLock`. Every operation acquires the lock for exactly one call and
//! releases it on all paths, so request handlers never hold store state
//! across awaits. Concurrent writers to the same id are last-write-wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::sync::RwLock;

use crate::core::{Result, StoreError};
use crate::query::Filter;
use crate::schema::Registry;

use super::collection::{Collection, Document, SummaryCounts};

pub struct DocumentStore {
    registry: Arc<Registry>,
    collections: RwLock<HashMap<String, Collection>>,
}

impl DocumentStore {
    pub fn new(registry: Registry) -> Self {
        let registry = Arc::new(registry);
        let collections = registry
            .resource_names()
            .filter_map(|name| {
                registry
                    .schema(name)
                    .map(|schema| (name.to_string(), Collection::new(schema.clone())))
            })
            .collect();
        Self {
            registry,
            collections: RwLock::new(collections),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn insert(
        &self,
        resource: &str,
        fields: JsonMap<String, JsonValue>,
    ) -> Result<Document> {
        let mut collections = self.collections.write().await;
        let collection = lookup_mut(&mut collections, resource)?;
        collection.insert(fields)
    }

    pub async fn get(&self, resource: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        let collection = lookup(&collections, resource)?;
        Ok(collection.get(id).cloned())
    }

    pub async fn update(
        &self,
        resource: &str,
        id: &str,
        patch: JsonMap<String, JsonValue>,
    ) -> Result<Document> {
        let mut collections = self.collections.write().await;
        let collection = lookup_mut(&mut collections, resource)?;
        collection.update(id, patch)
    }

    /// Returns false when the id does not exist.
    pub async fn remove(&self, resource: &str, id: &str) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let collection = lookup_mut(&mut collections, resource)?;
        Ok(collection.remove(id))
    }

    pub async fn find(
        &self,
        resource: &str,
        filter: &Filter,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<Document>, usize)> {
        let collections = self.collections.read().await;
        let collection = lookup(&collections, resource)?;
        Ok(collection.find(filter, page, limit))
    }

    pub async fn summary(&self, resource: &str) -> Result<SummaryCounts> {
        let collections = self.collections.read().await;
        let collection = lookup(&collections, resource)?;
        Ok(collection.summary(Utc::now()))
    }
}

fn lookup<'a>(
    collections: &'a HashMap<String, Collection>,
    resource: &str,
) -> Result<&'a Collection> {
    collections
        .get(resource)
        .ok_or_else(|| StoreError::CollectionNotFound(resource.to_string()))
}

fn lookup_mut<'a>(
    collections: &'a mut HashMap<String, Collection>,
    resource: &str,
) -> Result<&'a mut Collection> {
    collections
        .get_mut(resource)
        .ok_or_else(|| StoreError::CollectionNotFound(resource.to_string()))
}
