//! Training data endpoints
//!
//! Uploads take the raw CSV file as the request body
//! (`Content-Type: text/csv`), with `comment` and `sentiment` columns.

use super::ForceQuery;
use crate::db::{preprocessed, training, PreprocessedTraining, TrainingExample};
use crate::workflow::{
    preprocess_training, upload_training, PreprocessGuard, PreprocessOutcome, UploadOutcome,
};
use crate::{ApiResult, AppState};
use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};

/// GET /api/training
pub async fn list_training(State(state): State<AppState>) -> ApiResult<Json<Vec<TrainingExample>>> {
    Ok(Json(training::list_training(&state.db).await?))
}

/// POST /api/training/upload
pub async fn upload(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<UploadOutcome>> {
    Ok(Json(upload_training(&state.db, &body).await?))
}

/// GET /api/training/preprocessed
pub async fn list_preprocessed(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PreprocessedTraining>>> {
    Ok(Json(preprocessed::list_preprocessed_training(&state.db).await?))
}

/// POST /api/training/preprocess?force=
pub async fn preprocess(
    State(state): State<AppState>,
    Query(query): Query<ForceQuery>,
) -> ApiResult<Json<PreprocessOutcome>> {
    let guard = PreprocessGuard::new(state.preprocessing.allow_rerun);
    let outcome = preprocess_training(&state.db, &state.preprocessor, guard, query.force).await?;
    Ok(Json(outcome))
}

pub fn training_routes() -> Router<AppState> {
    Router::new()
        .route("/api/training", get(list_training))
        .route("/api/training/upload", post(upload))
        .route("/api/training/preprocessed", get(list_preprocessed))
        .route("/api/training/preprocess", post(preprocess))
}
