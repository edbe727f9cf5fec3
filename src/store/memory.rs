//! In-memory implementation of DocumentStore.
//!
//! Used by tests and by `tylernote serve --memory`. Data is lost when the
//! process exits.

use super::traits::{merge_fields, DocumentStore, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Collections keyed by name, documents keyed by id
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, HashMap<Uuid, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> StoreResult<()> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id, doc);
        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> StoreResult<Option<Value>> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(&id))
        else {
            return Ok(None);
        };
        merge_fields(doc, fields)?;
        Ok(Some(doc.clone()))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|docs| docs.remove(&id))
            .is_some())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_delete() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert("todos", id, json!({"id": id, "text": "a"}))
            .await
            .unwrap();

        assert_eq!(store.count("todos").await, 1);
        let doc = store.get("todos", id).await.unwrap().unwrap();
        assert_eq!(doc["text"], "a");

        assert!(store.delete("todos", id).await.unwrap());
        assert!(!store.delete("todos", id).await.unwrap());
        assert!(store.get("todos", id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store.insert("todos", id, json!({"id": id})).await.unwrap();
        assert!(store.get("notes", id).await.unwrap().is_none());
        assert!(store.list("notes").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_reports_missing() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert("notes", id, json!({"id": id, "title": "a", "content": "b"}))
            .await
            .unwrap();

        let fields = json!({"title": "z"}).as_object().cloned().unwrap();
        let merged = store.update("notes", id, fields.clone()).await.unwrap();
        assert_eq!(merged.unwrap()["content"], "b");
        assert_eq!(store.get("notes", id).await.unwrap().unwrap()["title"], "z");

        let missing = store.update("notes", Uuid::new_v4(), fields).await.unwrap();
        assert!(missing.is_none());
    }
}
