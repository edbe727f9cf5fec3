//! API route definitions

use super::handlers::{self, SharedState};
use super::thing_handlers;
use crate::models::*;
use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Daily plans
        // ====================================================================
        .route(
            "/api/today",
            get(thing_handlers::get_today).post(thing_handlers::create_today),
        )
        .route("/api/plans/past", get(thing_handlers::list_past_plans));

    // ========================================================================
    // Documents
    // ========================================================================
    let router = documents::<Plan>(router);
    let router = documents_with_list::<Todo>(router, get(thing_handlers::list_todos));
    let router = documents_with_list::<BuyListItem>(router, get(thing_handlers::list_buy_list));
    let router = documents_with_list::<TalkNote>(router, get(thing_handlers::list_talk_notes));
    let router =
        documents_with_list::<ReadingListItem>(router, get(thing_handlers::list_reading_list));
    let router = documents_with_list::<Note>(router, get(thing_handlers::list_notes));
    let router = documents_with_list::<Creation>(router, get(thing_handlers::list_creations));
    let router = documents::<Spark>(router);
    let router = documents::<Movie>(router);
    let router = documents::<WeekendProject>(router);
    let router = documents::<Techie>(router);

    let router = router
        // ====================================================================
        // Publishing and tags
        // ====================================================================
        .route(
            "/api/notes/{id}/publish",
            post(thing_handlers::publish_note).delete(thing_handlers::unpublish_note),
        )
        .route("/api/notes/{id}/tags", post(thing_handlers::add_note_tag))
        .route(
            "/api/notes/{id}/tags/{tag}",
            axum::routing::delete(thing_handlers::remove_note_tag),
        )
        .route(
            "/api/creations/{id}/publish",
            post(thing_handlers::publish_creation).delete(thing_handlers::unpublish_creation),
        );

    // Static frontend with SPA fallback to index.html
    let router = match state.frontend_path.as_deref() {
        Some(dir) => {
            let index = Path::new(dir).join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router,
    };

    router
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `GET/POST /api/<route>` and `GET/PATCH/DELETE /api/<route>/{id}`
fn documents<T: Document>(router: Router<SharedState>) -> Router<SharedState> {
    documents_with_list::<T>(router, get(handlers::list_documents::<T>))
}

/// Same as [`documents`] with a custom list handler (for query filters)
fn documents_with_list<T: Document>(
    router: Router<SharedState>,
    list: MethodRouter<SharedState>,
) -> Router<SharedState> {
    router
        .route(
            &format!("/api/{}", T::ROUTE),
            list.post(handlers::create_document::<T>),
        )
        .route(
            &format!("/api/{}/{{id}}", T::ROUTE),
            get(handlers::get_document::<T>)
                .patch(handlers::update_document::<T>)
                .delete(handlers::delete_document::<T>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerState;
    use crate::things::Things;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt; // oneshot

    fn state_with_frontend(dir: &std::path::Path) -> SharedState {
        Arc::new(ServerState {
            things: Things::new(Arc::new(crate::store::MemoryStore::new())),
            frontend_path: Some(dir.to_string_lossy().to_string()),
        })
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_frontend_spa_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let state = state_with_frontend(dir.path());

        let (status, body) = get_text(create_router(state.clone()), "/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "console.log(1)");

        let (status, body) = get_text(create_router(state.clone()), "/notes/123").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html>app</html>");

        // API routes are not shadowed by the frontend
        let (status, body) = get_text(create_router(state), "/api/todos").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_unknown_route_without_frontend_is_404() {
        let app = create_router(crate::test_helpers::mock_server_state());
        let (status, _) = get_text(app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = create_router(crate::test_helpers::mock_server_state());
        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://example.com")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
