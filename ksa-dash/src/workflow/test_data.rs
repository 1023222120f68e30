//! Per-video test data: manual label import and comment preprocessing

use super::clean_texts;
use super::training::{GuardDecision, PreprocessGuard, PreprocessOutcome, PreprocessStatus};
use crate::db::{comments, preprocessed, videos, LabelUpdate, Video};
use crate::error::{ApiError, ApiResult};
use crate::nlp::TextPreprocessor;
use crate::services::label_import::parse_label_csv;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn require_video(pool: &SqlitePool, video_id: &str) -> ApiResult<Video> {
    videos::get_video(pool, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("video {}", video_id)))
}

/// Apply a `comment_id,sentiment` CSV to this video's comments
pub async fn import_labels(pool: &SqlitePool, video_id: &str, csv: &[u8]) -> ApiResult<LabelUpdate> {
    require_video(pool, video_id).await?;
    let labels = parse_label_csv(csv)?;

    let outcome = comments::apply_labels(pool, video_id, &labels).await?;
    if !outcome.unmatched.is_empty() {
        warn!(
            video_id = %video_id,
            unmatched = outcome.unmatched.len(),
            "Some label rows name comments outside this video"
        );
    }
    info!(video_id = %video_id, updated = outcome.updated, "Manual labels applied");
    Ok(outcome)
}

/// Clean this video's comments into `preprocessed_test`
pub async fn preprocess_video(
    pool: &SqlitePool,
    preprocessor: &Arc<TextPreprocessor>,
    guard: PreprocessGuard,
    video_id: &str,
    force: bool,
) -> ApiResult<PreprocessOutcome> {
    require_video(pool, video_id).await?;
    let existing = preprocessed::count_preprocessed_test(pool, video_id).await?;

    let clear = match guard.decide(existing, force)? {
        GuardDecision::Skip => {
            info!(video_id = %video_id, rows = existing, "Comments already preprocessed, skipping");
            return Ok(PreprocessOutcome {
                status: PreprocessStatus::Skipped,
                rows: existing,
            });
        }
        GuardDecision::Run { clear } => clear,
    };

    let stored_comments = comments::list_comments(pool, video_id).await?;
    if stored_comments.is_empty() {
        return Err(ApiError::BadRequest(format!("video {} has no comments", video_id)));
    }

    let texts = stored_comments.into_iter().map(|c| c.comment).collect();
    let cleaned = clean_texts(preprocessor, texts).await?;
    let stored = preprocessed::store_preprocessed_test(pool, video_id, &cleaned, clear).await?;
    info!(video_id = %video_id, rows = stored, recomputed = clear, "Comments preprocessed");

    Ok(PreprocessOutcome {
        status: if clear {
            PreprocessStatus::Recomputed
        } else {
            PreprocessStatus::Created
        },
        rows: stored as i64,
    })
}
