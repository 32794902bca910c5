// src/server.rs
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::runner::{PipelineRunner, DEFAULT_SESSION};
use crate::types::FactCheckResponse;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<PipelineRunner>,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeReq {
    pub text: Option<String>,
    pub thread_id: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResp {
    pub status: &'static str,
}

pub enum ApiError {
    BadRequest(String),
    Pipeline(crate::error::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Pipeline(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub async fn transcribe(
    State(app): State<AppState>,
    body: Result<Json<TranscribeReq>, JsonRejection>,
) -> Result<Json<FactCheckResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| {
        error!(error = %rejection.body_text(), "unreadable request body");
        ApiError::BadRequest(rejection.body_text())
    })?;
    let Some(text) = req.text else {
        error!("missing 'text' field in request body");
        return Err(ApiError::BadRequest("Missing 'text' field in request body".into()));
    };
    let session = req.thread_id.unwrap_or_else(|| DEFAULT_SESSION.to_string());
    info!(session = %session, chars = text.chars().count(), "transcribe request");

    match app.runner.run(&text, &session).await {
        Ok(resp) => Ok(Json(resp)),
        Err(e) => {
            error!(session = %session, error = %e, "fact check failed");
            Err(ApiError::Pipeline(e))
        }
    }
}

pub async fn health() -> Json<HealthResp> {
    Json(HealthResp { status: "ok" })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server<F>(runner: PipelineRunner, addr: &str, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(AppState { runner: Arc::new(runner) });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
