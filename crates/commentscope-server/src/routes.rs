//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use commentscope_core::{ClassifiedComment, Comment};
use metrics::counter;
use serde_json::json;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::report::{
    AnalysisReport, AnalyzePostsRequest, AnalyzeRequest, ApiResponse, PostsReport, StatsReport,
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = if state.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/analyze", post(analyze))
        .route("/api/analyze-posts", post(analyze_posts))
        .route("/api/stats", post(stats))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "backend": state.pipeline.backend_name(),
        "model": state.pipeline.is_model_backed(),
        "workers": state.pipeline.workers(),
    }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    counter!("commentscope_requests_total", "endpoint" => "analyze").increment(1);
    info!(
        comments = request.comments.len(),
        post_url = request.post_url.as_deref().unwrap_or("-"),
        "Analyze request"
    );

    let classified = run_batch(&state, request.comments).await?;
    let result = state.pipeline.summarize(&classified);
    let report = AnalysisReport::new(request.post_url, result, &classified);
    Ok(Json(ApiResponse::ok(report)).into_response())
}

async fn analyze_posts(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzePostsRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    counter!("commentscope_requests_total", "endpoint" => "analyze_posts").increment(1);

    let comments: Vec<Comment> = request
        .posts
        .iter()
        .flat_map(|post| post.comments.iter().cloned())
        .collect();
    info!(
        posts = request.posts.len(),
        comments = comments.len(),
        "Bulk analyze request"
    );

    let classified = run_batch(&state, comments).await?;
    let result = state.pipeline.summarize(&classified);
    let report = PostsReport::new(&request.posts, result, &classified);
    Ok(Json(ApiResponse::ok(report)).into_response())
}

async fn stats(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<StatsReport>>, AppError> {
    let Json(request) = payload?;
    counter!("commentscope_requests_total", "endpoint" => "stats").increment(1);

    let classified = run_batch(&state, request.comments).await?;
    let result = state.pipeline.summarize(&classified);
    Ok(Json(ApiResponse::ok(StatsReport::from(result))))
}

async fn fallback() -> AppError {
    AppError::NotFound
}

/// Run one batch on its own task so a panicking backend fails only this request
async fn run_batch(
    state: &AppState,
    comments: Vec<Comment>,
) -> Result<Vec<ClassifiedComment>, AppError> {
    let pipeline = state.pipeline.clone();
    let classified = tokio::spawn(async move { pipeline.analyze_batch(comments).await }).await?;
    Ok(classified)
}

/// Error handling
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(#[from] JsonRejection),

    #[error("Not found")]
    NotFound,

    #[error("Analysis failed: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(rejection) => rejection.status(),
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
