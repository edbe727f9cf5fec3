use crate::models::Creation;
use crate::store::Collection;
use anyhow::Result;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

impl Collection<Creation> {
    pub async fn publish(&self, id: Uuid) -> Result<Option<Creation>> {
        let creation = self.set_published(id, true).await?;
        if creation.is_some() {
            info!(creation_id = %id, "Published creation");
        }
        Ok(creation)
    }

    pub async fn unpublish(&self, id: Uuid) -> Result<Option<Creation>> {
        self.set_published(id, false).await
    }

    pub async fn published(&self) -> Result<Vec<Creation>> {
        self.filter(|c| c.published).await
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Option<Creation>> {
        let mut fields = Map::new();
        fields.insert("published".to_string(), Value::Bool(published));
        self.set_fields(id, fields).await
    }
}
