//! One in-memory collection of documents
//!
//! Documents are JSON field maps with an opaque immutable id and two audit
//! timestamps. Uniqueness declared on the schema is enforced through
//! per-field value indexes maintained on every insert, update and delete.
//! Deletion is physical and immediate; there are no tombstones.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use uuid::Uuid;

use crate::core::{Result, StoreError};
use crate::query::Filter;
use crate::schema::ResourceSchema;

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: JsonMap<String, JsonValue>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts for the `/summary` endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryCounts {
    pub total: usize,
    #[serde(rename = "last24Hours")]
    pub last_24_hours: usize,
}

#[derive(Debug)]
pub struct Collection {
    schema: ResourceSchema,
    docs: HashMap<String, Document>,
    // field name -> canonical value -> owning document id
    unique: HashMap<String, HashMap<String, String>>,
}

impl Collection {
    pub fn new(schema: ResourceSchema) -> Self {
        let unique = schema
            .unique_fields()
            .map(|f| (f.name.clone(), HashMap::new()))
            .collect();
        Self {
            schema,
            docs: HashMap::new(),
            unique,
        }
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn insert(&mut self, fields: JsonMap<String, JsonValue>) -> Result<Document> {
        self.schema.validate_create(&fields)?;
        self.check_unique(&fields, None)?;

        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            fields,
            created_at: now,
            updated_at: now,
        };

        self.index(&doc);
        self.docs.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.get(id)
    }

    /// Partial field replacement. The id and `created_at` are immutable;
    /// `updated_at` is bumped. A null value clears an optional field.
    pub fn update(&mut self, id: &str, patch: JsonMap<String, JsonValue>) -> Result<Document> {
        self.schema.validate_patch(&patch)?;
        if !self.docs.contains_key(id) {
            return Err(StoreError::NotFound {
                collection: self.schema.name.clone(),
                id: id.to_string(),
            });
        }
        self.check_unique(&patch, Some(id))?;

        let doc = self
            .docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound {
                collection: self.schema.name.clone(),
                id: id.to_string(),
            })?;

        for (field, value) in patch {
            let previous = if value.is_null() {
                doc.fields.remove(&field)
            } else {
                doc.fields.insert(field.clone(), value.clone())
            };

            if let Some(index) = self.unique.get_mut(&field) {
                if let Some(previous) = previous {
                    index.remove(&canonical(&previous));
                }
                if !value.is_null() {
                    index.insert(canonical(&value), id.to_string());
                }
            }
        }
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    /// Physical delete. Returns false when the id does not exist.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(doc) = self.docs.remove(id) else {
            return false;
        };
        for (field, index) in &mut self.unique {
            if let Some(value) = doc.fields.get(field) {
                index.remove(&canonical(value));
            }
        }
        true
    }

    /// Filtered, sorted page of documents plus the filtered total.
    /// Sort order: most recently updated first, then most recently created.
    pub fn find(&self, filter: &Filter, page: usize, limit: usize) -> (Vec<Document>, usize) {
        let mut hits: Vec<&Document> = self.docs.values().filter(|d| filter.matches(d)).collect();
        hits.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = hits.len();
        let page = page.max(1);
        let start = (page - 1).saturating_mul(limit);
        let items = hits
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect();
        (items, total)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> SummaryCounts {
        let cutoff = now - Duration::hours(24);
        let last_24_hours = self
            .docs
            .values()
            .filter(|d| d.created_at >= cutoff)
            .count();
        SummaryCounts {
            total: self.docs.len(),
            last_24_hours,
        }
    }

    fn check_unique(
        &self,
        fields: &JsonMap<String, JsonValue>,
        exclude_id: Option<&str>,
    ) -> Result<()> {
        for (field, index) in &self.unique {
            let Some(value) = fields.get(field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            if let Some(owner) = index.get(&canonical(value))
                && exclude_id != Some(owner.as_str())
            {
                return Err(StoreError::DuplicateKey {
                    collection: self.schema.name.clone(),
                    field: field.clone(),
                    value: canonical(value),
                });
            }
        }
        Ok(())
    }

    fn index(&mut self, doc: &Document) {
        for (field, index) in &mut self.unique {
            if let Some(value) = doc.fields.get(field)
                && !value.is_null()
            {
                index.insert(canonical(value), doc.id.clone());
            }
        }
    }
}

/// Canonical index key for a unique value. JSON text keeps distinct types
/// distinct (`"1"` vs `1`).
fn canonical(value: &JsonValue) -> String {
    value.to_string()
}
