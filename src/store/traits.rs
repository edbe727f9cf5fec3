//! DocumentStore trait definition
//!
//! Abstract interface over schemaless JSON documents grouped in named
//! collections. Implementations only need to store and merge JSON; typing
//! happens one level up in [`crate::store::Collection`].

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt collection {collection}: {message}")]
    Corrupt { collection: String, message: String },

    #[error("Document is not a JSON object")]
    NotAnObject,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document under `id`, replacing any previous document.
    async fn insert(&self, collection: &str, id: Uuid, doc: Value) -> StoreResult<()>;

    /// Get a document by id
    async fn get(&self, collection: &str, id: Uuid) -> StoreResult<Option<Value>>;

    /// List all documents of a collection, in no particular order
    async fn list(&self, collection: &str) -> StoreResult<Vec<Value>>;

    /// Merge top-level fields into a document and return the result.
    ///
    /// Returns `None` if the document does not exist. The `id` field is
    /// never overwritten.
    async fn update(
        &self,
        collection: &str,
        id: Uuid,
        fields: Map<String, Value>,
    ) -> StoreResult<Option<Value>>;

    /// Delete a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: Uuid) -> StoreResult<bool>;

    /// Check that the backend is usable
    async fn health_check(&self) -> StoreResult<bool>;
}

/// Merge `fields` into `doc` the way a `$set` would: top-level keys are
/// replaced wholesale, `id` is left untouched.
pub(crate) fn merge_fields(doc: &mut Value, fields: Map<String, Value>) -> StoreResult<()> {
    let target = doc.as_object_mut().ok_or(StoreError::NotAnObject)?;
    for (key, value) in fields {
        if key == "id" {
            continue;
        }
        target.insert(key, value);
    }
    Ok(())
}
