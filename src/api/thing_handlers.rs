//! Entity-specific handlers: today's plan, list filters, tags and publishing

use super::handlers::{not_found, AppError, SharedState};
use crate::models::*;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

// ============================================================================
// Daily plans
// ============================================================================

/// Today's plan, or `null` if none was written yet
pub async fn get_today(State(state): State<SharedState>) -> Result<Json<Option<Plan>>, AppError> {
    Ok(Json(state.things.plans.get_today().await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateTodayRequest {
    #[serde(default)]
    pub text: String,
}

/// Create today's plan. Answers 201 for a new plan, 200 if one existed.
pub async fn create_today(
    State(state): State<SharedState>,
    body: Option<Json<CreateTodayRequest>>,
) -> Result<(StatusCode, Json<Plan>), AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let (plan, created) = state.things.plans.create_today(req.text).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(plan)))
}

pub async fn list_past_plans(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Plan>>, AppError> {
    Ok(Json(state.things.plans.past_plans().await?))
}

// ============================================================================
// List filters
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct CompletedQuery {
    pub completed: Option<bool>,
}

pub async fn list_todos(
    State(state): State<SharedState>,
    Query(query): Query<CompletedQuery>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = match query.completed {
        Some(completed) => state.things.todos.by_completed(completed).await?,
        None => state.things.todos.all().await?,
    };
    Ok(Json(todos))
}

pub async fn list_buy_list(
    State(state): State<SharedState>,
    Query(query): Query<CompletedQuery>,
) -> Result<Json<Vec<BuyListItem>>, AppError> {
    let items = match query.completed {
        Some(completed) => state.things.buy_list.by_completed(completed).await?,
        None => state.things.buy_list.all().await?,
    };
    Ok(Json(items))
}

#[derive(Debug, Deserialize, Default)]
pub struct DateQuery {
    pub date: Option<String>,
}

pub async fn list_talk_notes(
    State(state): State<SharedState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<TalkNote>>, AppError> {
    let notes = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(date) => state.things.talk_notes.by_date(date).await?,
        None => state.things.talk_notes.all().await?,
    };
    Ok(Json(notes))
}

#[derive(Debug, Deserialize, Default)]
pub struct ReadingTypeQuery {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

pub async fn list_reading_list(
    State(state): State<SharedState>,
    Query(query): Query<ReadingTypeQuery>,
) -> Result<Json<Vec<ReadingListItem>>, AppError> {
    let items = match query.item_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => {
            let item_type: ReadingType = raw.parse().map_err(AppError::BadRequest)?;
            state.things.reading_list.by_type(item_type).await?
        }
        None => state.things.reading_list.all().await?,
    };
    Ok(Json(items))
}

// ============================================================================
// Notes
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct NotesQuery {
    pub tag: Option<String>,
    pub published: Option<bool>,
}

pub async fn list_notes(
    State(state): State<SharedState>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<Note>>, AppError> {
    let mut notes = match query.tag.as_deref().filter(|t| !t.is_empty()) {
        Some(tag) => state.things.notes.by_tag(tag).await?,
        None => state.things.notes.all().await?,
    };
    if let Some(published) = query.published {
        notes.retain(|n| n.published == published);
    }
    Ok(Json(notes))
}

pub async fn publish_note(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, AppError> {
    state
        .things
        .notes
        .publish(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Note>(id))
}

pub async fn unpublish_note(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, AppError> {
    state
        .things
        .notes
        .unpublish(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Note>(id))
}

pub async fn add_note_tag(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<TagRequest>,
) -> Result<Json<Note>, AppError> {
    if normalize_tag(&req.tag).is_none() {
        return Err(AppError::BadRequest("Tag must not be empty".to_string()));
    }
    state
        .things
        .notes
        .add_tag(id, &req.tag)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Note>(id))
}

pub async fn remove_note_tag(
    State(state): State<SharedState>,
    Path((id, tag)): Path<(Uuid, String)>,
) -> Result<Json<Note>, AppError> {
    if normalize_tag(&tag).is_none() {
        return Err(AppError::BadRequest("Tag must not be empty".to_string()));
    }
    state
        .things
        .notes
        .remove_tag(id, &tag)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Note>(id))
}

// ============================================================================
// Creations
// ============================================================================

#[derive(Debug, Deserialize, Default)]
pub struct PublishedQuery {
    pub published: Option<bool>,
}

pub async fn list_creations(
    State(state): State<SharedState>,
    Query(query): Query<PublishedQuery>,
) -> Result<Json<Vec<Creation>>, AppError> {
    let creations = match query.published {
        Some(true) => state.things.creations.published().await?,
        Some(false) => state.things.creations.filter(|c| !c.published).await?,
        None => state.things.creations.all().await?,
    };
    Ok(Json(creations))
}

pub async fn publish_creation(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Creation>, AppError> {
    state
        .things
        .creations
        .publish(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Creation>(id))
}

pub async fn unpublish_creation(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Creation>, AppError> {
    state
        .things
        .creations
        .unpublish(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Creation>(id))
}

#[cfg(test)]
mod tests {
    use crate::api::create_router;
    use crate::test_helpers::mock_server_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt; // oneshot

    async fn call(
        state: &crate::api::SharedState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = create_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_today_flow() {
        let state = mock_server_state();

        let (status, body) = call(&state, "GET", "/api/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        let (status, plan) = call(&state, "POST", "/api/today", Some(json!({"text": "focus"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(plan["text"], "focus");

        let (status, again) = call(&state, "POST", "/api/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["id"], plan["id"]);

        let (_, today) = call(&state, "GET", "/api/today", None).await;
        assert_eq!(today["id"], plan["id"]);

        let (status, past) = call(&state, "GET", "/api/plans/past", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(past.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_todo_completed_filter() {
        let state = mock_server_state();
        call(&state, "POST", "/api/todos", Some(json!({"text": "a"}))).await;
        call(&state, "POST", "/api/todos", Some(json!({"text": "b", "completed": true}))).await;

        let (_, open) = call(&state, "GET", "/api/todos?completed=false", None).await;
        assert_eq!(open.as_array().unwrap().len(), 1);
        assert_eq!(open[0]["text"], "a");

        let (_, all) = call(&state, "GET", "/api/todos", None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reading_list_type_filter() {
        let state = mock_server_state();
        call(&state, "POST", "/api/reading-list", Some(json!({"name": "SICP", "type": "book"}))).await;
        call(&state, "POST", "/api/reading-list", Some(json!({"name": "Post", "type": "article"}))).await;

        let (status, books) = call(&state, "GET", "/api/reading-list?type=book", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(books.as_array().unwrap().len(), 1);

        let (status, body) = call(&state, "GET", "/api/reading-list?type=podcast", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("podcast"));
    }

    #[tokio::test]
    async fn test_note_tags_and_publish() {
        let state = mock_server_state();
        let (_, note) = call(
            &state,
            "POST",
            "/api/notes",
            Some(json!({"title": "t", "content": "c", "date": "2024-03-10"})),
        )
        .await;
        let id = note["id"].as_str().unwrap();

        let (status, tagged) = call(
            &state,
            "POST",
            &format!("/api/notes/{}/tags", id),
            Some(json!({"tag": "rust"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tagged["tags"], json!(["rust"]));

        let (_, by_tag) = call(&state, "GET", "/api/notes?tag=rust", None).await;
        assert_eq!(by_tag.as_array().unwrap().len(), 1);

        let (status, _) = call(
            &state,
            "POST",
            &format!("/api/notes/{}/tags", id),
            Some(json!({"tag": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, untagged) =
            call(&state, "DELETE", &format!("/api/notes/{}/tags/%20rust", id), None).await;
        assert_eq!(untagged["tags"], json!([]));

        let (status, _) =
            call(&state, "DELETE", &format!("/api/notes/{}/tags/%20", id), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, published) =
            call(&state, "POST", &format!("/api/notes/{}/publish", id), None).await;
        assert_eq!(published["published"], true);
        let (_, public) = call(&state, "GET", "/api/notes?published=true", None).await;
        assert_eq!(public.as_array().unwrap().len(), 1);

        let (_, hidden) =
            call(&state, "DELETE", &format!("/api/notes/{}/publish", id), None).await;
        assert_eq!(hidden["published"], false);
    }

    #[tokio::test]
    async fn test_publish_unknown_creation_is_404() {
        let state = mock_server_state();
        let uri = format!("/api/creations/{}/publish", uuid::Uuid::new_v4());
        let (status, body) = call(&state, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn test_creations_published_filter() {
        let state = mock_server_state();
        let (_, c) = call(
            &state,
            "POST",
            "/api/creations",
            Some(json!({"name": "n", "description": "d", "link": "l", "type": "app", "img": ""})),
        )
        .await;
        let id = c["id"].as_str().unwrap();
        call(&state, "POST", &format!("/api/creations/{}/publish", id), None).await;

        let (_, published) = call(&state, "GET", "/api/creations?published=true", None).await;
        assert_eq!(published.as_array().unwrap().len(), 1);
        let (_, drafts) = call(&state, "GET", "/api/creations?published=false", None).await;
        assert!(drafts.as_array().unwrap().is_empty());
    }
}
