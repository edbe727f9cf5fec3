//! Creative and hobby documents: creations, sparks, movies, weekend
//! projects and techies (tech-follow list)

use super::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Creations
// ============================================================================

/// Something built and optionally shown on the public site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Creation {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub link: String,
    #[serde(rename = "type")]
    pub creation_type: String,
    pub img: String,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCreationRequest {
    pub name: String,
    pub description: String,
    pub link: String,
    #[serde(rename = "type")]
    pub creation_type: String,
    pub img: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCreationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub creation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl Document for Creation {
    const COLLECTION: &'static str = "creations";
    const ROUTE: &'static str = "creations";

    type Create = CreateCreationRequest;
    type Patch = UpdateCreationRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateCreationRequest) -> Self {
        Self {
            id,
            name: create.name,
            description: create.description,
            link: create.link,
            creation_type: create.creation_type,
            img: create.img,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Sparks
// ============================================================================

/// A quick idea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spark {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSparkRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSparkRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Document for Spark {
    const COLLECTION: &'static str = "sparks";
    const ROUTE: &'static str = "sparks";

    type Create = CreateSparkRequest;
    type Patch = UpdateSparkRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateSparkRequest) -> Self {
        Self {
            id,
            name: create.name,
            notes: String::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Movies
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub watched: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watched: Option<bool>,
}

impl Document for Movie {
    const COLLECTION: &'static str = "movies";
    const ROUTE: &'static str = "movies";

    type Create = CreateMovieRequest;
    type Patch = UpdateMovieRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateMovieRequest) -> Self {
        Self {
            id,
            title: create.title,
            notes: create.notes,
            genre: create.genre,
            release_year: create.release_year,
            rating: None,
            watched: false,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Weekend projects
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekendProject {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWeekendProjectRequest {
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWeekendProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Document for WeekendProject {
    const COLLECTION: &'static str = "weekendProjects";
    const ROUTE: &'static str = "weekend-projects";

    type Create = CreateWeekendProjectRequest;
    type Patch = UpdateWeekendProjectRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateWeekendProjectRequest) -> Self {
        Self {
            id,
            title: create.title,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Techies
// ============================================================================

/// An entry in the tech-follow list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Techie {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTechieRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTechieRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Document for Techie {
    const COLLECTION: &'static str = "techies";
    const ROUTE: &'static str = "techies";

    type Create = CreateTechieRequest;
    type Patch = UpdateTechieRequest;

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_create(id: Uuid, now: DateTime<Utc>, create: CreateTechieRequest) -> Self {
        Self {
            id,
            title: create.title,
            content: create.content,
            url: create.url,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_patch_uses_camel_case() {
        let req: UpdateMovieRequest =
            serde_json::from_str(r#"{"releaseYear":1999,"watched":true}"#).unwrap();
        assert_eq!(req.release_year, Some(1999));
        assert_eq!(req.watched, Some(true));
        assert_eq!(req.rating, None);
    }

    #[test]
    fn test_new_spark_is_open_with_empty_notes() {
        let spark = Spark::from_create(
            Uuid::new_v4(),
            Utc::now(),
            CreateSparkRequest {
                name: "solar oven".into(),
            },
        );
        assert!(!spark.completed);
        assert!(spark.notes.is_empty());
    }

    #[test]
    fn test_creation_type_field_name() {
        let req: CreateCreationRequest = serde_json::from_str(
            r#"{"name":"n","description":"d","link":"l","type":"app","img":"i"}"#,
        )
        .unwrap();
        let creation = Creation::from_create(Uuid::new_v4(), Utc::now(), req);
        let json = serde_json::to_value(&creation).unwrap();
        assert_eq!(json["type"], "app");
        assert_eq!(json["published"], false);
    }
}
