//! Crawl endpoint
//!
//! POST /api/crawl `{"video_id": "...", "max_comments": 100}`

use crate::workflow::{crawl_video, CrawlOutcome};
use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    pub video_id: String,
    /// Defaults to `analysis.max_comments`
    pub max_comments: Option<usize>,
}

pub async fn crawl(
    State(state): State<AppState>,
    Json(request): Json<CrawlRequest>,
) -> ApiResult<Json<CrawlOutcome>> {
    let youtube = state.youtube.as_deref().ok_or_else(|| {
        ApiError::NotConfigured(
            "no YouTube API key; set KSA_YOUTUBE_API_KEY or youtube_api_key".to_string(),
        )
    })?;

    let max_comments = request.max_comments.unwrap_or(state.analysis.max_comments);
    let outcome = crawl_video(&state.db, youtube, &request.video_id, max_comments).await?;
    Ok(Json(outcome))
}

pub fn crawl_routes() -> Router<AppState> {
    Router::new().route("/api/crawl", post(crawl))
}
