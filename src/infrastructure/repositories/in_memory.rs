//! In-memory document store
//!
//! Thread-safe implementation of [`DocumentStore`] and [`SearchIndex`] backed
//! by nested maps. Collections are created on first write; documents within a
//! collection are ordered by key, so ISO-dated keys come back chronologically.
//!
//! Data is lost on restart. Useful for tests and for dry runs of the
//! publishing step.

use crate::domain::repositories::{Document, DocumentStore, SearchIndex};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type Collections = HashMap<String, BTreeMap<String, Document>>;

#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection` (0 if it does not exist)
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn set(&self, collection: &str, key: &str, fields: Document) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), fields);
        Ok(())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl SearchIndex for InMemoryDocumentStore {
    async fn bulk_upsert(&self, index: &str, documents: Vec<(String, Document)>) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(index.to_string()).or_default();
        let n = documents.len();
        docs.extend(documents);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(close: f64) -> Document {
        let mut d = Document::new();
        d.insert("Adj Close".to_string(), json!(close));
        d
    }

    #[tokio::test]
    async fn test_set_replaces_existing_key() {
        let store = InMemoryDocumentStore::new();
        store.set("price_data", "2024-01-02", doc(1.0)).await.unwrap();
        store.set("price_data", "2024-01-02", doc(2.0)).await.unwrap();

        assert_eq!(store.count("price_data").await, 1);
        let got = store.get("price_data", "2024-01-02").await.unwrap().unwrap();
        assert_eq!(got["Adj Close"], json!(2.0));
    }

    #[tokio::test]
    async fn test_get_all_ordered_by_key() {
        let store = InMemoryDocumentStore::new();
        store.set("price_data", "2024-01-03", doc(3.0)).await.unwrap();
        store.set("price_data", "2024-01-01", doc(1.0)).await.unwrap();

        let all = store.get_all("price_data").await.unwrap();
        assert_eq!(all, vec![doc(1.0), doc(3.0)]);
        assert!(store.get_all("unknown").await.unwrap().is_empty());
        assert!(store.get("unknown", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_upsert() {
        let store = InMemoryDocumentStore::new();
        let n = store
            .bulk_upsert(
                "sentiment_data",
                vec![("a".to_string(), doc(1.0)), ("a".to_string(), doc(2.0))],
            )
            .await
            .unwrap();

        assert_eq!(n, 2);
        assert_eq!(store.count("sentiment_data").await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryDocumentStore::new();
        let other = store.clone();
        other.set("c", "k", doc(1.0)).await.unwrap();
        assert_eq!(store.count("c").await, 1);
    }
}
