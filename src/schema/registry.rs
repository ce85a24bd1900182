use std::collections::BTreeMap;

use crate::core::{Result, StoreError};

use super::{FieldDescriptor as F, ResourceSchema};

/// Named set of resource schemas. The registry is read-only once built; the
/// store creates one collection per entry.
#[derive(Debug, Clone)]
pub struct Registry {
    schemas: BTreeMap<String, ResourceSchema>,
}

impl Registry {
    pub fn new(schemas: Vec<ResourceSchema>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for schema in schemas {
            if schema.name.is_empty() {
                return Err(StoreError::Validation(
                    "Resource name must not be empty".to_string(),
                ));
            }
            if map.insert(schema.name.clone(), schema).is_some() {
                return Err(StoreError::Validation(
                    "Duplicate resource name in registry".to_string(),
                ));
            }
        }
        Ok(Self { schemas: map })
    }

    /// Parses a registry from a JSON array of resource schemas, the format
    /// deployments point `RESOURCE_SCHEMA_PATH` at.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let schemas: Vec<ResourceSchema> = serde_json::from_str(raw)
            .map_err(|e| StoreError::Validation(format!("Invalid schema file: {e}")))?;
        Self::new(schemas)
    }

    pub fn schema(&self, resource: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The generated resources of the original dashboard, as data.
    pub fn dashboard_default() -> Self {
        let schemas = vec![
            ResourceSchema::new(
                "users",
                vec![
                    F::text("name").required().searchable(),
                    F::text("email").required().unique().searchable(),
                    F::text("phone").searchable(),
                    F::enumeration("role", &["admin", "editor", "member"]),
                    F::boolean("active"),
                    F::object("profile"),
                ],
            ),
            ResourceSchema::new(
                "accounts",
                vec![
                    F::text("company").required().searchable(),
                    F::text("email").required().unique().searchable(),
                    F::text("user_id"),
                    F::enumeration("plan", &["free", "pro", "enterprise"]),
                    F::number("seats").searchable(),
                ],
            ),
            ResourceSchema::new(
                "payments",
                vec![
                    F::text("user_id").searchable(),
                    F::text("reference").required().unique().searchable(),
                    F::number("amount").required().searchable(),
                    F::enumeration("status", &["pending", "paid", "failed", "refunded"]),
                    F::text("currency"),
                ],
            ),
            ResourceSchema::new(
                "reviews",
                vec![
                    F::text("user_id"),
                    F::text("title").searchable(),
                    F::text("body").searchable(),
                    F::number("rating").required().searchable(),
                    F::boolean("published"),
                ],
            ),
            ResourceSchema::new(
                "sections",
                vec![
                    F::text("title").required().searchable(),
                    F::text("slug").required().unique(),
                    F::enumeration("kind", &["hero", "features", "pricing", "faq", "cta"]),
                    F::number("position").searchable(),
                    F::object("content"),
                ],
            ),
            ResourceSchema::new(
                "media",
                vec![
                    F::text("filename").required().searchable(),
                    F::text("url").required().unique(),
                    F::enumeration("kind", &["image", "video", "document"]),
                    F::number("size_bytes").searchable(),
                    F::text("uploaded_by"),
                ],
            ),
            ResourceSchema::new(
                "products",
                vec![
                    F::text("title").required().searchable(),
                    F::text("sku").required().unique().searchable(),
                    F::number("price").required().searchable(),
                    F::number("stock").searchable(),
                    F::text_array("tags"),
                    F::boolean("published"),
                ],
            ),
            ResourceSchema::new(
                "orders",
                vec![
                    F::text("user_id").searchable(),
                    F::text("number").required().unique().searchable(),
                    F::number("total").required().searchable(),
                    F::enumeration(
                        "status",
                        &["draft", "placed", "shipped", "delivered", "cancelled"],
                    ),
                    F::object("shipping"),
                ],
            ),
            ResourceSchema::new(
                "categories",
                vec![
                    F::text("name").required().searchable(),
                    F::text("slug").required().unique(),
                    F::text("parent_id"),
                    F::number("position").searchable(),
                ],
            ),
            ResourceSchema::new(
                "coupons",
                vec![
                    F::text("code").required().unique().searchable(),
                    F::number("percent_off").searchable(),
                    F::date("expires_at"),
                    F::boolean("active"),
                ],
            ),
            ResourceSchema::new(
                "blogs",
                vec![
                    F::text("title").required().searchable(),
                    F::text("slug").required().unique(),
                    F::text("body").searchable(),
                    F::text("author_id"),
                    F::text_array("tags"),
                    F::boolean("published"),
                ],
            ),
            ResourceSchema::new(
                "pages",
                vec![
                    F::text("title").required().searchable(),
                    F::text("slug").required().unique().searchable(),
                    F::text_array("section_ids"),
                    F::boolean("published"),
                ],
            ),
            ResourceSchema::new(
                "testimonials",
                vec![
                    F::text("author").required().searchable(),
                    F::text("quote").required().searchable(),
                    F::number("rating").searchable(),
                    F::boolean("featured"),
                ],
            ),
            ResourceSchema::new(
                "subscribers",
                vec![
                    F::text("email").required().unique().searchable(),
                    F::enumeration("source", &["landing", "checkout", "import"]),
                    F::boolean("confirmed"),
                ],
            ),
            ResourceSchema::new(
                "contacts",
                vec![
                    F::text("name").required().searchable(),
                    F::text("email").required().searchable(),
                    F::text("subject").searchable(),
                    F::text("message").required(),
                    F::boolean("handled"),
                ],
            ),
        ];

        Self::new(schemas).expect("built-in registry is well-formed")
    }
}
