//! Video and test-label endpoints

use super::ForceQuery;
use crate::db::{comments, preprocessed, videos, Comment, LabelUpdate, PreprocessedTest, Video, VideoSummary};
use crate::workflow::{import_labels, preprocess_video, PreprocessGuard, PreprocessOutcome};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

/// A video with every stored comment
#[derive(Debug, Serialize)]
pub struct VideoDetail {
    pub video: Video,
    pub comments: Vec<Comment>,
}

/// GET /api/videos
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<VideoSummary>>> {
    Ok(Json(videos::list_videos(&state.db).await?))
}

/// GET /api/videos/:video_id
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<VideoDetail>> {
    let video = videos::get_video(&state.db, &video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("video {}", video_id)))?;
    let comments = comments::list_comments(&state.db, &video_id).await?;
    Ok(Json(VideoDetail { video, comments }))
}

/// POST /api/videos/:video_id/labels
///
/// Body is a CSV with `comment_id` and `sentiment` columns.
pub async fn upload_labels(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<LabelUpdate>> {
    Ok(Json(import_labels(&state.db, &video_id, &body).await?))
}

/// GET /api/videos/:video_id/preprocessed
pub async fn list_preprocessed(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<Vec<PreprocessedTest>>> {
    Ok(Json(preprocessed::list_preprocessed_test(&state.db, &video_id).await?))
}

/// POST /api/videos/:video_id/preprocess?force=
pub async fn preprocess(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<ForceQuery>,
) -> ApiResult<Json<PreprocessOutcome>> {
    let guard = PreprocessGuard::new(state.preprocessing.allow_rerun);
    let outcome =
        preprocess_video(&state.db, &state.preprocessor, guard, &video_id, query.force).await?;
    Ok(Json(outcome))
}

pub fn video_routes() -> Router<AppState> {
    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/videos/:video_id", get(get_video))
        .route("/api/videos/:video_id/labels", post(upload_labels))
        .route("/api/videos/:video_id/preprocessed", get(list_preprocessed))
        .route("/api/videos/:video_id/preprocess", post(preprocess))
}
