//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static front end from `./static` with index fallback
/// - CORS (allow any origin/method/headers); tighten before exposing beyond localhost
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/lessons", get(http::http_list_lessons))
        .route("/api/v1/lesson", get(http::http_get_lesson))
        .route("/api/v1/run", post(http::http_post_run))
        .route("/api/v1/grade", post(http::http_post_grade))
        .route("/api/v1/solution", get(http::http_get_solution))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::TeacherConfig;
    use crate::executor::{Executor, TIMEOUT_MESSAGE};

    fn app_with(executor: Executor) -> Router {
        let state = AppState::from_config(TeacherConfig::default()).with_executor(executor);
        build_router(Arc::new(state))
    }

    fn app() -> Router {
        app_with(Executor::new("python3"))
    }

    async fn json_of(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health() {
        let resp = app()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_of(resp).await["ok"], true);
    }

    #[tokio::test]
    async fn lessons_and_lesson_view() {
        let resp = app()
            .oneshot(Request::get("/api/v1/lessons").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let v = json_of(resp).await;
        assert_eq!(v["lessons"].as_array().unwrap().len(), 2);
        assert_eq!(v["lessons"][1]["title"], "Logic Puzzles");

        let resp = app()
            .oneshot(Request::get("/api/v1/lesson?lessonId=python-basics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = json_of(resp).await;
        assert_eq!(v["challenge"]["tests"][0]["expression"], "is_prime(2)");
        assert_eq!(v["challenge"]["tests"][0]["expected"], "True");
    }

    #[tokio::test]
    async fn unknown_lesson_is_404() {
        let resp = app()
            .oneshot(Request::get("/api/v1/solution?lessonId=nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(resp).await["message"], "Unknown lessonId: nope");

        let resp = app()
            .oneshot(post_json("/api/v1/grade", serde_json::json!({ "lessonId": "nope", "code": "" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn run_endpoint_reports_timeout_and_warning() {
        let dir = TempDir::new().unwrap();
        let app = app_with(Executor::new("sh").with_scratch_dir(dir.path()));
        let resp = app
            .oneshot(post_json("/api/v1/run", serde_json::json!({ "code": "sleep 10", "timeoutSecs": 1 })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = json_of(resp).await;
        assert_eq!(v["stdout"], "");
        assert_eq!(v["stderr"], TIMEOUT_MESSAGE);
        assert_eq!(v["timedOut"], true);
        assert!(v["warning"].as_str().unwrap().contains("untrusted"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn grade_endpoint_reports_launch_failure_as_ungraded() {
        let app = app_with(Executor::new("/nonexistent/interpreter-binary"));
        let resp = app
            .oneshot(post_json("/api/v1/grade", serde_json::json!({ "lessonId": "logic-puzzles", "code": "" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v = json_of(resp).await;
        assert_eq!(v["score"], 0);
        assert_eq!(v["total"], 0);
        assert_eq!(v["ungraded"], 3);
        assert_eq!(v["summary"], "Score: 0 / 0");
        assert!(v["stderr"].as_str().unwrap().starts_with("Execution failed to start"));
    }
}
