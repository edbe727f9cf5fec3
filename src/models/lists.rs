//! Checklist-style documents: todos, the buy list and the reading list

use super::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Todo
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Document for Todo {
    const COLLECTION: &'static str = "todos";
    const ROUTE: &'static str = "todos";

    type Create = CreateTodoRequest;
    type Patch = UpdateTodoRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateTodoRequest) -> Self {
        Self {
            id,
            text: create.text,
            completed: create.completed,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Buy list
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuyListItem {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBuyListItemRequest {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBuyListItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Document for BuyListItem {
    const COLLECTION: &'static str = "buyList";
    const ROUTE: &'static str = "buy-list";

    type Create = CreateBuyListItemRequest;
    type Patch = UpdateBuyListItemRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateBuyListItemRequest) -> Self {
        Self {
            id,
            text: create.text,
            completed: create.completed,
            url: create.url,
            notes: create.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Reading list
// ============================================================================

/// Kind of reading list entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReadingType {
    Article,
    Book,
}

impl fmt::Display for ReadingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => write!(f, "article"),
            Self::Book => write!(f, "book"),
        }
    }
}

impl FromStr for ReadingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "book" => Ok(Self::Book),
            _ => Err(format!("Unknown reading type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ReadingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReadingListItemRequest {
    pub name: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ReadingType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReadingListItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ReadingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Document for ReadingListItem {
    const COLLECTION: &'static str = "readingList";
    const ROUTE: &'static str = "reading-list";

    type Create = CreateReadingListItemRequest;
    type Patch = UpdateReadingListItemRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateReadingListItemRequest) -> Self {
        Self {
            id,
            name: create.name,
            url: create.url,
            item_type: create.item_type,
            notes: create.notes,
            created_at: now,
            updated_at: now,
        }
    }
}
