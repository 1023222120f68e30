//! Analysis endpoints

use crate::classifier::SentimentClassifier;
use crate::workflow::{analyze_video, build_report, AnalysisOutcome, AnalysisReport};
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

/// POST /api/videos/:video_id/analyze
///
/// Runs under the configured `analysis.prediction_policy`; `reject`
/// answers 409 once the video has predictions.
pub async fn analyze(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<AnalysisOutcome>> {
    let classifier = SentimentClassifier::from(&state.analysis);
    let outcome = analyze_video(
        &state.db,
        &state.preprocessor,
        &classifier,
        state.analysis.prediction_policy,
        &video_id,
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/videos/:video_id/report
pub async fn report(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<AnalysisReport>> {
    Ok(Json(build_report(&state.db, &video_id).await?))
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/videos/:video_id/analyze", post(analyze))
        .route("/api/videos/:video_id/report", get(report))
}
