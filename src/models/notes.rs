//! Talk notes and free-form notes

use super::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Talk notes
// ============================================================================

/// Notes taken during a talk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TalkNote {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub speaker: String,
    /// Date of the talk as entered by the user (e.g. "2024-03-10")
    pub date: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTalkNoteRequest {
    pub title: String,
    pub content: String,
    pub speaker: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTalkNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Document for TalkNote {
    const COLLECTION: &'static str = "talkNotes";
    const ROUTE: &'static str = "talk-notes";

    type Create = CreateTalkNoteRequest;
    type Patch = UpdateTalkNoteRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateTalkNoteRequest) -> Self {
        Self {
            id,
            title: create.title,
            content: create.content,
            speaker: create.speaker,
            date: create.date,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Notes
// ============================================================================

/// A free-form note. Published notes are visible on the public site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Body of `POST /api/notes/{id}/tags`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

/// Normalize a user-entered tag. Returns None for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

impl Document for Note {
    const COLLECTION: &'static str = "notes";
    const ROUTE: &'static str = "notes";

    type Create = CreateNoteRequest;
    type Patch = UpdateNoteRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateNoteRequest) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for tag in create.tags.iter().filter_map(|t| normalize_tag(t)) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Self {
            id,
            title: create.title,
            content: create.content,
            date: create.date,
            tags,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_is_unpublished_with_unique_tags() {
        let req = CreateNoteRequest {
            title: "Ideas".into(),
            content: "".into(),
            date: "2024-03-10".into(),
            tags: vec!["rust".into(), " rust ".into(), "".into(), "web".into()],
        };
        let note = Note::from_create(Uuid::new_v4(), Utc::now(), req);
        assert!(!note.published);
        assert_eq!(note.tags, vec!["rust".to_string(), "web".to_string()]);
        assert!(note.has_tag("web"));
        assert!(!note.has_tag("go"));
    }

    #[test]
    fn test_note_without_tags_field_deserializes() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "t",
            "content": "c",
            "date": "d",
            "createdAt": Utc::now(),
            "updatedAt": Utc::now(),
        });
        let note: Note = serde_json::from_value(json).unwrap();
        assert!(note.tags.is_empty());
        assert!(!note.published);
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  books "), Some("books".to_string()));
        assert_eq!(normalize_tag("   "), None);
    }
}
