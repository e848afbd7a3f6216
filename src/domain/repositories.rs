//! Document store abstractions
//!
//! Cleaned records are published to an external key-value document store
//! (one collection per table, keyed by date) or, alternatively, bulk-indexed
//! into a search engine. Both are reached only through these traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use newsprice::domain::repositories::DocumentStore;
//! use newsprice::infrastructure::InMemoryDocumentStore;
//!
//! # async {
//! let store = InMemoryDocumentStore::new();
//! // store.set("price_data", "2024-01-02", fields).await?;
//! // let docs = store.get_all("price_data").await?;
//! # };
//! ```

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A flat field map, as stored by the document backend.
pub type Document = Map<String, Value>;

pub const SENTIMENT_COLLECTION: &str = "sentiment_data";
pub const PRICE_COLLECTION: &str = "price_data";

/// Key-value document collections with upsert semantics
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace the document stored under `key`
    async fn set(&self, collection: &str, key: &str, fields: Document) -> Result<()>;

    /// Fetch one document
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>>;

    /// Fetch every document of a collection
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>>;
}

/// Search-engine index accepting bulk upserts keyed by document id
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Index all `(id, document)` pairs, replacing existing ids. Returns the number indexed.
    async fn bulk_upsert(&self, index: &str, documents: Vec<(String, Document)>) -> Result<usize>;
}
