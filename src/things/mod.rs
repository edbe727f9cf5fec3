//! Service layer over every document collection
//!
//! [`Things`] owns one typed [`Collection`] per entity. Entity-specific
//! operations (today's plan, tags, publishing, filters) live in the
//! submodules as inherent impls on the matching collection.

mod lists;
mod notes;
mod plans;
mod projects;

use crate::models::*;
use crate::store::{Collection, DocumentStore};
use anyhow::Result;
use std::sync::Arc;

/// All collections of the notebook
#[derive(Clone)]
pub struct Things {
    store: Arc<dyn DocumentStore>,
    pub plans: Collection<Plan>,
    pub todos: Collection<Todo>,
    pub buy_list: Collection<BuyListItem>,
    pub talk_notes: Collection<TalkNote>,
    pub reading_list: Collection<ReadingListItem>,
    pub notes: Collection<Note>,
    pub creations: Collection<Creation>,
    pub sparks: Collection<Spark>,
    pub movies: Collection<Movie>,
    pub weekend_projects: Collection<WeekendProject>,
    pub techies: Collection<Techie>,
}

impl Things {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            plans: Collection::new(store.clone()),
            todos: Collection::new(store.clone()),
            buy_list: Collection::new(store.clone()),
            talk_notes: Collection::new(store.clone()),
            reading_list: Collection::new(store.clone()),
            notes: Collection::new(store.clone()),
            creations: Collection::new(store.clone()),
            sparks: Collection::new(store.clone()),
            movies: Collection::new(store.clone()),
            weekend_projects: Collection::new(store.clone()),
            techies: Collection::new(store.clone()),
            store,
        }
    }

    /// Generic access to the collection of any document type
    pub fn collection<T: Document>(&self) -> Collection<T> {
        Collection::new(self.store.clone())
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.store.health_check().await?)
    }
}

#[cfg(test)]
pub(crate) fn things() -> Things {
    Things::new(Arc::new(crate::store::MemoryStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generic_collection_shares_store() {
        let things = things();
        let spark = things
            .sparks
            .create(CreateSparkRequest {
                name: "kite".into(),
            })
            .await
            .unwrap();
        let via_generic = things.collection::<Spark>().get(spark.id).await.unwrap();
        assert_eq!(via_generic, Some(spark));
        assert!(things.health_check().await.unwrap());
    }
}
