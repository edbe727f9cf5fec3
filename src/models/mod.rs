//! Document models and DTOs
//!
//! Every entity is a flat JSON document with a generated id and
//! creation/update timestamps. Each one has a create request (required
//! fields) and a patch request (all optional; only present fields are
//! written).

pub mod lists;
pub mod notes;
pub mod plan;
pub mod projects;

pub use lists::*;
pub use notes::*;
pub use plan::*;
pub use projects::*;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// A document stored in its own collection and exposed under `/api/<ROUTE>`.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name in the document store
    const COLLECTION: &'static str;
    /// Path segment under `/api`
    const ROUTE: &'static str;

    /// Body accepted when creating a document
    type Create: Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Body accepted when updating a document
    type Patch: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    /// Build a fresh document from a create request.
    fn from_create(id: Uuid, now: DateTime<Utc>, create: Self::Create) -> Self;
}
