//! Typed HTTP client for the notebook API
//!
//! Mirrors every route of [`crate::api`]. Used by the `tn` CLI and by
//! [`crate::editor::EditSession`] for autosave.

use crate::models::*;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

/// Error body produced by the API (`{"error": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Base URL joined with percent-encoded path segments
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send<R: DeserializeOwned>(&self, req: RequestBuilder) -> Result<R, ClientError> {
        let response = check(req.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        check(req.send().await?).await?;
        Ok(())
    }

    // ========================================================================
    // Generic document operations
    // ========================================================================

    pub async fn list<T: Document>(&self) -> Result<Vec<T>, ClientError> {
        self.send(self.client.get(self.url(&["api", T::ROUTE]))).await
    }

    pub async fn get<T: Document>(&self, id: Uuid) -> Result<T, ClientError> {
        let id = id.to_string();
        self.send(self.client.get(self.url(&["api", T::ROUTE, &id])))
            .await
    }

    pub async fn create<T: Document>(&self, req: &T::Create) -> Result<T, ClientError> {
        self.send(self.client.post(self.url(&["api", T::ROUTE])).json(req))
            .await
    }

    pub async fn update<T: Document>(&self, id: Uuid, patch: &T::Patch) -> Result<T, ClientError> {
        debug!(route = T::ROUTE, id = %id, "Sending update");
        let id = id.to_string();
        self.send(
            self.client
                .patch(self.url(&["api", T::ROUTE, &id]))
                .json(patch),
        )
        .await
    }

    pub async fn delete<T: Document>(&self, id: Uuid) -> Result<(), ClientError> {
        let id = id.to_string();
        self.send_empty(self.client.delete(self.url(&["api", T::ROUTE, &id])))
            .await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.send(self.client.get(self.url(&["health"]))).await
    }

    // ========================================================================
    // Daily plans
    // ========================================================================

    pub async fn today(&self) -> Result<Option<Plan>, ClientError> {
        self.send(self.client.get(self.url(&["api", "today"]))).await
    }

    /// Create today's plan, or return the existing one
    pub async fn create_today(&self, text: &str) -> Result<Plan, ClientError> {
        let body = serde_json::json!({ "text": text });
        self.send(self.client.post(self.url(&["api", "today"])).json(&body))
            .await
    }

    pub async fn past_plans(&self) -> Result<Vec<Plan>, ClientError> {
        self.send(self.client.get(self.url(&["api", "plans", "past"])))
            .await
    }

    // ========================================================================
    // Filtered lists
    // ========================================================================

    pub async fn todos(&self, completed: Option<bool>) -> Result<Vec<Todo>, ClientError> {
        let mut req = self.client.get(self.url(&["api", Todo::ROUTE]));
        if let Some(completed) = completed {
            req = req.query(&[("completed", completed)]);
        }
        self.send(req).await
    }

    pub async fn buy_list(&self, completed: Option<bool>) -> Result<Vec<BuyListItem>, ClientError> {
        let mut req = self.client.get(self.url(&["api", BuyListItem::ROUTE]));
        if let Some(completed) = completed {
            req = req.query(&[("completed", completed)]);
        }
        self.send(req).await
    }

    pub async fn talk_notes(&self, date: Option<&str>) -> Result<Vec<TalkNote>, ClientError> {
        let mut req = self.client.get(self.url(&["api", TalkNote::ROUTE]));
        if let Some(date) = date {
            req = req.query(&[("date", date)]);
        }
        self.send(req).await
    }

    pub async fn reading_list(
        &self,
        item_type: Option<ReadingType>,
    ) -> Result<Vec<ReadingListItem>, ClientError> {
        let mut req = self.client.get(self.url(&["api", ReadingListItem::ROUTE]));
        if let Some(item_type) = item_type {
            req = req.query(&[("type", item_type.to_string())]);
        }
        self.send(req).await
    }

    pub async fn notes(&self, tag: Option<&str>) -> Result<Vec<Note>, ClientError> {
        let mut req = self.client.get(self.url(&["api", Note::ROUTE]));
        if let Some(tag) = tag {
            req = req.query(&[("tag", tag)]);
        }
        self.send(req).await
    }

    pub async fn creations(&self, published: Option<bool>) -> Result<Vec<Creation>, ClientError> {
        let mut req = self.client.get(self.url(&["api", Creation::ROUTE]));
        if let Some(published) = published {
            req = req.query(&[("published", published)]);
        }
        self.send(req).await
    }

    // ========================================================================
    // Notes and creations
    // ========================================================================

    pub async fn publish_note(&self, id: Uuid) -> Result<Note, ClientError> {
        let id = id.to_string();
        self.send(self.client.post(self.url(&["api", "notes", &id, "publish"])))
            .await
    }

    pub async fn unpublish_note(&self, id: Uuid) -> Result<Note, ClientError> {
        let id = id.to_string();
        self.send(self.client.delete(self.url(&["api", "notes", &id, "publish"])))
            .await
    }

    pub async fn add_note_tag(&self, id: Uuid, tag: &str) -> Result<Note, ClientError> {
        let id = id.to_string();
        let body = TagRequest {
            tag: tag.to_string(),
        };
        self.send(
            self.client
                .post(self.url(&["api", "notes", &id, "tags"]))
                .json(&body),
        )
        .await
    }

    pub async fn remove_note_tag(&self, id: Uuid, tag: &str) -> Result<Note, ClientError> {
        let id = id.to_string();
        self.send(
            self.client
                .delete(self.url(&["api", "notes", &id, "tags", tag])),
        )
        .await
    }

    pub async fn publish_creation(&self, id: Uuid) -> Result<Creation, ClientError> {
        let id = id.to_string();
        self.send(self.client.post(self.url(&["api", "creations", &id, "publish"])))
            .await
    }

    pub async fn unpublish_creation(&self, id: Uuid) -> Result<Creation, ClientError> {
        let id = id.to_string();
        self.send(self.client.delete(self.url(&["api", "creations", &id, "publish"])))
            .await
    }
}

/// Turn non-2xx responses into a [`ClientError`], keeping the server's
/// error message when it sent one.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or(body);
    if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(message))
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn note_json(id: Uuid, tags: &[&str]) -> Value {
        json!({
            "id": id,
            "title": "t",
            "content": "c",
            "date": "2024-03-10",
            "tags": tags,
            "published": false,
            "createdAt": "2024-03-10T15:00:00Z",
            "updatedAt": "2024-03-10T15:00:00Z",
        })
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_joins_and_encodes_segments() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        let url = client.url(&["api", "notes", "x", "tags", "big ideas"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/notes/x/tags/big%20ideas"
        );

        let prefixed = ApiClient::new("http://host/tn").unwrap();
        assert_eq!(prefixed.url(&["health"]).as_str(), "http://host/tn/health");
    }

    #[tokio::test]
    async fn test_update_sends_patch_body() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("PATCH"))
            .and(path(format!("/api/notes/{}", id)))
            .and(body_json(json!({"title": "new"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(note_json(id, &[])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let patch = UpdateNoteRequest {
            title: Some("new".into()),
            ..Default::default()
        };
        let note = client.update::<Note>(id, &patch).await.unwrap();
        assert_eq!(note.id, id);
    }

    #[tokio::test]
    async fn test_not_found_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "todos x not found"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.get::<Todo>(Uuid::new_v4()).await.unwrap_err();
        match err {
            ClientError::NotFound(msg) => assert_eq!(msg, "todos x not found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.todos(None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Status { status: 500, ref message } if message == "boom"
        ));
    }

    #[tokio::test]
    async fn test_filters_become_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .and(query_param("completed", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/reading-list"))
            .and(query_param("type", "book"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        assert!(client.todos(Some(false)).await.unwrap().is_empty());
        assert!(client
            .reading_list(Some(ReadingType::Book))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_today_may_be_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/today"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        assert!(client.today().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_tag() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path(format!("/api/notes/{}/tags", id)))
            .and(body_json(json!({"tag": "rust"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(note_json(id, &["rust"])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let note = client.add_note_tag(id, "rust").await.unwrap();
        assert_eq!(note.tags, vec!["rust"]);
    }
}
