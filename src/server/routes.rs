//! Axum route handlers for the helper HTTP service.
//!
//! # Routes
//!
//! - `GET  /ping`         : Returns `{"status": "ok", "message": "pong"}`
//! - `POST /scriptor`     : `{"prompt": s}` → `{"backend": "scriptor", "response": s}`
//! - `POST /master`       : same shape, master helper
//! - `POST /micro`        : same shape, micro helper
//! - `POST /patcher`      : same shape, patcher helper
//! - `POST /multimodel`   : same shape, multimodel helper
//! - `POST /rewrite`      : same shape, rewriter tool (`"backend": "rewriter"`)
//! - `GET  /memory/recall`: `{"recall": s}` from the master helper's engine
//! - `POST /memory/store` : `{"data": s}` → `{"stored": bool}`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::helpers::{HelperKind, HelperRouter};

type ApiError = (StatusCode, Json<Value>);

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<HelperRouter>,
}

impl AppState {
    pub fn new(router: Arc<HelperRouter>) -> Self {
        Self { router }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptResponse {
    pub backend: String,
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub data: String,
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/scriptor", post(scriptor_handler))
        .route("/master", post(master_handler))
        .route("/micro", post(micro_handler))
        .route("/patcher", post(patcher_handler))
        .route("/multimodel", post(multimodel_handler))
        .route("/rewrite", post(rewrite_handler))
        .route("/memory/recall", get(recall_handler))
        .route("/memory/store", post(store_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn rejected(rejection: JsonRejection) -> ApiError {
    error(rejection.status(), rejection.body_text())
}

/// GET /ping: liveness check.
async fn ping_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "pong" }))
}

/// Run one helper turn on the blocking pool.
async fn run_helper(
    state: AppState,
    kind: HelperKind,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    let Json(request) = payload.map_err(rejected)?;
    if request.prompt.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "empty prompt"));
    }
    let prompt = request.prompt;

    let router = Arc::clone(&state.router);
    let response = tokio::task::spawn_blocking(move || router.run(kind.key(), &prompt))
        .await
        .map_err(|e| {
            tracing::error!("{} turn panicked: {}", kind, e);
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(PromptResponse {
        backend: kind.key().to_string(),
        response,
    }))
}

async fn scriptor_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    run_helper(state, HelperKind::Scriptor, payload).await
}

async fn master_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    run_helper(state, HelperKind::Master, payload).await
}

async fn micro_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    run_helper(state, HelperKind::Micro, payload).await
}

async fn patcher_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    run_helper(state, HelperKind::Patcher, payload).await
}

async fn multimodel_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    run_helper(state, HelperKind::MultiModel, payload).await
}

async fn rewrite_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>, ApiError> {
    run_helper(state, HelperKind::Rewriter, payload).await
}

/// GET /memory/recall
async fn recall_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let router = Arc::clone(&state.router);
    let recall = tokio::task::spawn_blocking(move || router.recall_memory())
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(json!({ "recall": recall })))
}

/// POST /memory/store
async fn store_handler(
    State(state): State<AppState>,
    payload: Result<Json<StoreRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(rejected)?;
    let router = Arc::clone(&state.router);
    let stored = tokio::task::spawn_blocking(move || router.store_memory(&request.data))
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(json!({ "stored": stored })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        app_router(AppState::new(Arc::new(HelperRouter::ephemeral())))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_ping_endpoint() {
        let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["message"], "pong");
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let response = app()
            .oneshot(post_json("/micro", r#"{"prompt": "   "}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "empty prompt");

        let response = app().oneshot(post_json("/master", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_prompt_forwarded_untrimmed() {
        use crate::engine::EngineOptions;
        use crate::helpers::Helper;
        use crate::llm::{last_user_content, ChatMessage, GenerationError};
        use crate::memory::MemoryStore;

        let echo = Helper::new(
            HelperKind::Micro,
            MemoryStore::ephemeral(),
            Box::new(|m: &[ChatMessage]| -> Result<String, GenerationError> {
                Ok(format!("{:?}", last_user_content(m)))
            }),
        )
        .with_options(EngineOptions {
            recursive: false,
            multi_agent: false,
            self_eval: false,
        });
        let app = app_router(AppState::new(Arc::new(HelperRouter::new().with_helper(echo))));

        let response = app
            .oneshot(post_json("/micro", r#"{"prompt": "    return x\n"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["response"], r#""    return x\n""#);
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let response = app()
            .oneshot(post_json("/scriptor", "not json"))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_micro_round_trip() {
        let response = app()
            .oneshot(post_json("/micro", r#"{"prompt": "hello there"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["backend"], "micro");
        assert!(json["response"].as_str().unwrap().starts_with("[Micro Brain]"));
    }

    #[tokio::test]
    async fn test_rewrite_reports_rewriter_backend() {
        let response = app()
            .oneshot(post_json("/rewrite", r#"{"prompt": "tidy   this"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["backend"], "rewriter");
    }

    #[tokio::test]
    async fn test_memory_store_then_recall() {
        let app = app();
        let response = app
            .clone()
            .oneshot(post_json("/memory/store", r#"{"data": "the launch is on friday"}"#))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["stored"], true);

        let request = Request::builder()
            .uri("/memory/recall")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let json = body_json(response).await;
        assert!(json["recall"].as_str().unwrap().contains("the launch is on friday"));
    }

    #[tokio::test]
    async fn test_store_blank_is_not_stored() {
        let response = app()
            .oneshot(post_json("/memory/store", r#"{"data": ""}"#))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["stored"], false);
    }
}
