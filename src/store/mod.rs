//! Schemaless document persistence: collections of JSON bodies keyed by
//! string ids, read back with equality filters.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Backend(String),
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every equality filter holds for `body`.
    pub fn matches(&self, body: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| body.get(field) == Some(expected))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fresh unique id for a document about to be written.
    fn new_id(&self) -> String;

    /// Create or overwrite a document.
    async fn set(&self, collection: &str, id: &str, body: Value) -> Result<(), StoreError>;

    /// Write only if `id` is free. `false` when a document already holds it.
    async fn create(&self, collection: &str, id: &str, body: Value) -> Result<bool, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Removing a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
