//! Typed repository over a [`DocumentStore`] collection

use super::traits::DocumentStore;
use crate::models::Document;
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// All documents of type `T`, stored in `T::COLLECTION`.
///
/// Clones share one edit lock, held by read-modify-write operations
/// (tags, today's plan) so concurrent requests cannot interleave them.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    edits: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            edits: self.edits.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            edits: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    /// Serialize a read-modify-write sequence against other holders.
    pub(crate) async fn lock_edits(&self) -> MutexGuard<'_, ()> {
        self.edits.lock().await
    }

    /// All documents, oldest first
    pub async fn all(&self) -> Result<Vec<T>> {
        let values = self
            .store
            .list(T::COLLECTION)
            .await
            .with_context(|| format!("Failed to list {}", T::COLLECTION))?;
        let mut docs = values
            .into_iter()
            .map(decode::<T>)
            .collect::<Result<Vec<_>>>()?;
        docs.sort_by_key(|d| (d.created_at(), d.id()));
        Ok(docs)
    }

    /// Documents matching a predicate, oldest first
    pub async fn filter<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let mut docs = self.all().await?;
        docs.retain(|d| predicate(d));
        Ok(docs)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<T>> {
        self.store
            .get(T::COLLECTION, id)
            .await
            .with_context(|| format!("Failed to get {} {}", T::COLLECTION, id))?
            .map(decode::<T>)
            .transpose()
    }

    pub async fn create(&self, request: T::Create) -> Result<T> {
        let doc = T::from_create(Uuid::new_v4(), Utc::now(), request);
        let value = serde_json::to_value(&doc)?;
        self.store
            .insert(T::COLLECTION, doc.id(), value)
            .await
            .with_context(|| format!("Failed to insert into {}", T::COLLECTION))?;
        Ok(doc)
    }

    /// Apply a patch. Only fields present in the patch are written;
    /// `updatedAt` is always bumped. Returns `None` for an unknown id.
    pub async fn update(&self, id: Uuid, patch: &T::Patch) -> Result<Option<T>> {
        let fields = match serde_json::to_value(patch)? {
            Value::Object(fields) => fields,
            other => return Err(anyhow!("Patch for {} is not an object: {}", T::COLLECTION, other)),
        };
        self.set_fields(id, fields).await
    }

    /// Merge raw top-level fields into a document, bumping `updatedAt`.
    pub async fn set_fields(&self, id: Uuid, mut fields: Map<String, Value>) -> Result<Option<T>> {
        fields.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
        self.store
            .update(T::COLLECTION, id, fields)
            .await
            .with_context(|| format!("Failed to update {} {}", T::COLLECTION, id))?
            .map(decode::<T>)
            .transpose()
    }

    /// Delete a document. Returns whether it existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.store
            .delete(T::COLLECTION, id)
            .await
            .with_context(|| format!("Failed to delete {} {}", T::COLLECTION, id))
    }
}

fn decode<T: Document>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .with_context(|| format!("Malformed document in {}", T::COLLECTION))
}
