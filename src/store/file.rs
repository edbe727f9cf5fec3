//! File-backed implementation of DocumentStore.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as a JSON array.
//! Everything is loaded into memory at open; every mutation rewrites the
//! whole collection file through a temp file + rename, so a crash never
//! leaves a half-written file behind. A mutation whose write fails is rolled
//! back in memory as well.

use super::traits::{merge_fields, DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

pub struct FileStore {
    dir: PathBuf,
    collections: RwLock<HashMap<String, HashMap<Uuid, Value>>>,
}

impl FileStore {
    /// Open (or create) a data directory and load every collection in it.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut collections = HashMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let docs = load_collection(name, &path)?;
            debug!(collection = name, count = docs.len(), "Loaded collection");
            collections.insert(name.to_string(), docs);
        }

        info!(dir = %dir.display(), collections = collections.len(), "Opened file store");
        Ok(Self {
            dir,
            collections: RwLock::new(collections),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Rewrite a collection file from the in-memory copy.
    async fn persist(&self, collection: &str, docs: &HashMap<Uuid, Value>) -> StoreResult<()> {
        let mut sorted: Vec<(&Uuid, &Value)> = docs.iter().collect();
        sorted.sort_by_key(|(id, _)| **id);
        let values: Vec<&Value> = sorted.into_iter().map(|(_, v)| v).collect();
        let bytes = serde_json::to_vec_pretty(&values)?;

        let dir = self.dir.clone();
        let path = self.collection_path(collection);
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;
        debug!(collection, count = docs.len(), "Persisted collection");
        Ok(())
    }
}

fn load_collection(name: &str, path: &Path) -> StoreResult<HashMap<Uuid, Value>> {
    let raw = std::fs::read(path)?;
    let values: Vec<Value> = serde_json::from_slice(&raw)?;

    let mut docs = HashMap::with_capacity(values.len());
    for value in values {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Uuid>().ok())
            .ok_or_else(|| StoreError::Corrupt {
                collection: name.to_string(),
                message: "document without a valid id".to_string(),
            })?;
        docs.insert(id, value);
    }
    Ok(docs)
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        let previous = docs.insert(id, doc);
        if let Err(e) = self.persist(collection, docs).await {
            match previous {
                Some(previous) => docs.insert(id, previous),
                None => docs.remove(&id),
            };
            return Err(e);
        }
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
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(doc) = docs.get_mut(&id) else {
            return Ok(None);
        };
        let original = doc.clone();
        merge_fields(doc, fields)?;
        let merged = doc.clone();
        if let Err(e) = self.persist(collection, docs).await {
            docs.insert(id, original);
            return Err(e);
        }
        Ok(Some(merged))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(removed) = docs.remove(&id) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(collection, docs).await {
            docs.insert(id, removed);
            return Err(e);
        }
        Ok(true)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(tokio::fs::metadata(&self.dir).await?.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store
                .insert("todos", id, json!({"id": id, "text": "persist me"}))
                .await
                .unwrap();
            let fields = json!({"completed": true}).as_object().cloned().unwrap();
            store.update("todos", id, fields).await.unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        let doc = store.get("todos", id).await.unwrap().unwrap();
        assert_eq!(doc["text"], "persist me");
        assert_eq!(doc["completed"], true);
        assert!(dir.path().join("todos.json").exists());
    }

    #[tokio::test]
    async fn test_delete_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let store = FileStore::open(dir.path()).unwrap();
        store.insert("notes", id, json!({"id": id})).await.unwrap();
        assert!(store.delete("notes", id).await.unwrap());
        assert!(!store.delete("notes", id).await.unwrap());

        let reopened = FileStore::open(dir.path()).unwrap();
        assert!(reopened.list("notes").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let result = store
            .update("movies", Uuid::new_v4(), Map::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        let store = FileStore::open(&data).unwrap();
        let kept = Uuid::new_v4();
        store
            .insert("todos", kept, json!({"id": kept, "text": "keep"}))
            .await
            .unwrap();

        std::fs::remove_dir_all(&data).unwrap();

        let lost = Uuid::new_v4();
        assert!(store
            .insert("todos", lost, json!({"id": lost}))
            .await
            .is_err());
        assert!(store.get("todos", lost).await.unwrap().is_none());

        let fields = json!({"text": "changed"}).as_object().cloned().unwrap();
        assert!(store.update("todos", kept, fields).await.is_err());
        assert_eq!(store.get("todos", kept).await.unwrap().unwrap()["text"], "keep");

        assert!(store.delete("todos", kept).await.is_err());
        assert!(store.get("todos", kept).await.unwrap().is_some());
        assert_eq!(store.list("todos").await.unwrap().len(), 1);
    }

    #[test]
    fn test_open_rejects_document_without_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sparks.json"), r#"[{"name":"x"}]"#).unwrap();
        let err = FileStore::open(dir.path()).err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_open_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.txt"), "not json").unwrap();
        assert!(FileStore::open(dir.path()).is_ok());
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.health_check().await.unwrap());
        assert_eq!(store.dir(), dir.path());
    }
}
