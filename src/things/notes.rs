use crate::models::{normalize_tag, Note};
use crate::store::Collection;
use anyhow::{bail, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

impl Collection<Note> {
    /// Add a tag to a note. Adding an existing tag is a no-op.
    pub async fn add_tag(&self, id: Uuid, tag: &str) -> Result<Option<Note>> {
        let Some(tag) = normalize_tag(tag) else {
            bail!("Tag must not be empty");
        };
        let _guard = self.lock_edits().await;
        let Some(note) = self.get(id).await? else {
            return Ok(None);
        };
        if note.has_tag(&tag) {
            debug!(note_id = %id, tag = %tag, "Note already has tag");
            return Ok(Some(note));
        }
        let mut tags = note.tags;
        tags.push(tag);
        self.set_tags(id, tags).await
    }

    /// Remove a tag from a note. The tag is trimmed the same way as in
    /// [`Collection::add_tag`].
    pub async fn remove_tag(&self, id: Uuid, tag: &str) -> Result<Option<Note>> {
        let Some(tag) = normalize_tag(tag) else {
            bail!("Tag must not be empty");
        };
        let _guard = self.lock_edits().await;
        let Some(note) = self.get(id).await? else {
            return Ok(None);
        };
        let tags: Vec<String> = note.tags.into_iter().filter(|t| *t != tag).collect();
        self.set_tags(id, tags).await
    }

    async fn set_tags(&self, id: Uuid, tags: Vec<String>) -> Result<Option<Note>> {
        let mut fields = Map::new();
        fields.insert("tags".to_string(), json!(tags));
        self.set_fields(id, fields).await
    }

    pub async fn by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        self.filter(|n| n.has_tag(tag)).await
    }

    pub async fn publish(&self, id: Uuid) -> Result<Option<Note>> {
        let note = self.set_published(id, true).await?;
        if note.is_some() {
            info!(note_id = %id, "Published note");
        }
        Ok(note)
    }

    pub async fn unpublish(&self, id: Uuid) -> Result<Option<Note>> {
        self.set_published(id, false).await
    }

    pub async fn published(&self) -> Result<Vec<Note>> {
        self.filter(|n| n.published).await
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Option<Note>> {
        let mut fields = Map::new();
        fields.insert("published".to_string(), Value::Bool(published));
        self.set_fields(id, fields).await
    }
}
