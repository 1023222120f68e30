//! Training data upload and preprocessing
//!
//! Preprocessed rows are computed once: a second request finds the table
//! non-empty and does nothing, even when training rows were uploaded since.
//! `force` recomputes from scratch, but only when re-runs are enabled.

use crate::db::{preprocessed, training};
use crate::error::{ApiError, ApiResult};
use super::clean_texts;
use crate::nlp::TextPreprocessor;
use crate::services::label_import::parse_training_csv;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

/// Compute-once check for derived preprocessed rows
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessGuard {
    allow_rerun: bool,
}

/// What the guard allows for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Rows already exist; leave them
    Skip,
    /// Compute rows, clearing the old ones first when `clear` is set
    Run { clear: bool },
}

impl PreprocessGuard {
    pub fn new(allow_rerun: bool) -> Self {
        Self { allow_rerun }
    }

    pub fn decide(&self, existing_rows: i64, force: bool) -> ApiResult<GuardDecision> {
        if force {
            if !self.allow_rerun {
                return Err(ApiError::Conflict(
                    "re-running preprocessing is disabled (preprocessing.allow_rerun = false)"
                        .to_string(),
                ));
            }
            return Ok(GuardDecision::Run { clear: true });
        }

        if existing_rows > 0 {
            Ok(GuardDecision::Skip)
        } else {
            Ok(GuardDecision::Run { clear: false })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessStatus {
    Created,
    Skipped,
    Recomputed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreprocessOutcome {
    pub status: PreprocessStatus,
    pub rows: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub inserted: usize,
    pub total: i64,
}

/// Validate and append a training CSV
pub async fn upload_training(pool: &SqlitePool, csv: &[u8]) -> ApiResult<UploadOutcome> {
    let rows = parse_training_csv(csv)?;
    let inserted = training::insert_training(pool, &rows).await?;
    let total = training::count_training(pool).await?;

    info!(inserted, total, "Training data uploaded");
    Ok(UploadOutcome { inserted, total })
}

/// Clean every training row into `preprocessed_training`
pub async fn preprocess_training(
    pool: &SqlitePool,
    preprocessor: &Arc<TextPreprocessor>,
    guard: PreprocessGuard,
    force: bool,
) -> ApiResult<PreprocessOutcome> {
    let existing = preprocessed::count_preprocessed_training(pool).await?;

    let clear = match guard.decide(existing, force)? {
        GuardDecision::Skip => {
            info!(rows = existing, "Training data already preprocessed, skipping");
            return Ok(PreprocessOutcome {
                status: PreprocessStatus::Skipped,
                rows: existing,
            });
        }
        GuardDecision::Run { clear } => clear,
    };

    let examples = training::list_training(pool).await?;
    if examples.is_empty() {
        return Err(ApiError::BadRequest("no training data uploaded".to_string()));
    }

    let (comments, labels): (Vec<String>, Vec<String>) = examples
        .into_iter()
        .map(|e| (e.comment, e.sentiment))
        .unzip();
    let cleaned = clean_texts(preprocessor, comments).await?;
    let rows: Vec<(String, String)> = cleaned.into_iter().zip(labels).collect();

    let stored = preprocessed::store_preprocessed_training(pool, &rows, clear).await?;
    info!(rows = stored, recomputed = clear, "Training data preprocessed");

    Ok(PreprocessOutcome {
        status: if clear {
            PreprocessStatus::Recomputed
        } else {
            PreprocessStatus::Created
        },
        rows: stored as i64,
    })
}
