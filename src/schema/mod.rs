//! Resource Schemas
//!
//! Every REST resource served by dashstore is described by a
//! [`ResourceSchema`]: an explicit, statically-known list of typed field
//! descriptors. One generic engine parameterized by these descriptors
//! replaces per-resource copies of the same CRUD/search/bulk logic.

mod registry;

pub use registry::Registry;

use crate::core::{Result, StoreError};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Semantic kind of one business field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-form UTF-8 string.
    Text,
    /// Finite number (integer or float on the wire).
    Number,
    Boolean,
    /// RFC 3339 timestamp or `YYYY-MM-DD` calendar date, as a string.
    Date,
    /// One of a fixed set of string variants.
    Enum(Vec<String>),
    /// Array of strings (tags, category ids, ...).
    TextArray,
    /// Nested JSON object, not validated field-by-field.
    Object,
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enum(_) => "enum",
            Self::TextArray => "text array",
            Self::Object => "object",
        }
    }
}

/// One declared field of a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Business-rule uniqueness (e.g. one email per account).
    #[serde(default)]
    pub unique: bool,
    /// Enrolls a `Text` field in the OR-search and a `Number` field in
    /// numeric equality search.
    #[serde(default)]
    pub searchable: bool,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
            unique: false,
            searchable: false,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn date(name: &str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn enumeration(name: &str, variants: &[&str]) -> Self {
        Self::new(
            name,
            FieldKind::Enum(variants.iter().map(|v| (*v).to_string()).collect()),
        )
    }

    pub fn text_array(name: &str) -> Self {
        Self::new(name, FieldKind::TextArray)
    }

    pub fn object(name: &str) -> Self {
        Self::new(name, FieldKind::Object)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Checks one submitted value against the declared kind.
    fn check_value(&self, value: &JsonValue) -> Result<()> {
        // Null clears an optional field.
        if value.is_null() {
            if self.required {
                return Err(StoreError::Validation(format!(
                    "Field '{}' is required and cannot be null",
                    self.name
                )));
            }
            return Ok(());
        }

        let ok = match &self.kind {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.as_f64().is_some_and(f64::is_finite),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Date => value.as_str().is_some_and(parses_as_date),
            FieldKind::Enum(variants) => value
                .as_str()
                .is_some_and(|s| variants.iter().any(|v| v == s)),
            FieldKind::TextArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(JsonValue::is_string)),
            FieldKind::Object => value.is_object(),
        };

        if ok {
            Ok(())
        } else {
            Err(StoreError::Validation(format!(
                "Field '{}' expects {} but got {value}",
                self.name,
                self.kind.describe()
            )))
        }
    }
}

fn parses_as_date(raw: &str) -> bool {
    DateTime::parse_from_rfc3339(raw).is_ok() || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

/// Declared shape of one resource (collection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ResourceSchema {
    pub fn new(name: &str, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Text fields enrolled in the free-text OR-search.
    pub fn searchable_text_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.searchable && f.kind == FieldKind::Text)
    }

    /// Number fields enrolled in numeric equality search.
    pub fn searchable_numeric_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.searchable && f.kind == FieldKind::Number)
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.unique)
    }

    /// Validates a full create payload: unknown fields rejected, required
    /// fields present, every value matching its declared kind.
    pub fn validate_create(&self, payload: &JsonMap<String, JsonValue>) -> Result<()> {
        self.validate_fields(payload)?;

        for field in self.fields.iter().filter(|f| f.required) {
            match payload.get(&field.name) {
                None | Some(JsonValue::Null) => {
                    return Err(StoreError::Validation(format!(
                        "Field '{}' is required",
                        field.name
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Validates a partial update payload: only the submitted fields are
    /// checked, required fields may be absent but not nulled out.
    pub fn validate_patch(&self, payload: &JsonMap<String, JsonValue>) -> Result<()> {
        if payload.is_empty() {
            return Err(StoreError::Validation(
                "Update payload must contain at least one field".to_string(),
            ));
        }
        self.validate_fields(payload)
    }

    fn validate_fields(&self, payload: &JsonMap<String, JsonValue>) -> Result<()> {
        for (name, value) in payload {
            let Some(field) = self.field(name) else {
                return Err(StoreError::Validation(format!(
                    "Unknown field '{name}' for resource '{}'",
                    self.name
                )));
            };
            field.check_value(value)?;
        }
        Ok(())
    }
}
