use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Record '{id}' not found in '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("Duplicate key: '{field}' already has value {value} in '{collection}'")]
    DuplicateKey {
        collection: String,
        field: String,
        value: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
