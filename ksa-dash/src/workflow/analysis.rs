//! Sentiment analysis runs and per-video reports
//!
//! A run trains a fresh model on `preprocessed_training`, cleans the
//! video's comments, predicts one label per comment and stores them under a
//! new run id. What happens when the video already has predictions is
//! decided by [`PredictionPolicy`].

use super::test_data::require_video;
use crate::classifier::{ClassifierError, Evaluation, SentimentClassifier};
use crate::db::{comments, predictions, preprocessed, PredictionRow, Video};
use crate::error::{ApiError, ApiResult};
use crate::nlp::TextPreprocessor;
use ksa_common::config::PredictionPolicy;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub run_id: Uuid,
    pub predictions: usize,
    /// Earlier predictions deleted by the `replace` policy
    pub replaced: bool,
    pub evaluation: Evaluation,
}

/// True-vs-predicted counts over comments that carry a manual label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub true_labels: Vec<String>,
    pub predicted_labels: Vec<String>,
    /// `counts[i][j]`: comments labeled `true_labels[i]` predicted as `predicted_labels[j]`
    pub counts: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub video: Video,
    pub predictions: Vec<PredictionRow>,
    /// Predicted label -> count, the pie chart data
    pub distribution: BTreeMap<String, usize>,
    pub confusion_matrix: ConfusionMatrix,
}

/// Train, predict and store one analysis run for `video_id`
pub async fn analyze_video(
    pool: &SqlitePool,
    preprocessor: &Arc<TextPreprocessor>,
    classifier: &SentimentClassifier,
    policy: PredictionPolicy,
    video_id: &str,
) -> ApiResult<AnalysisOutcome> {
    require_video(pool, video_id).await?;

    let stored_comments = comments::list_comments(pool, video_id).await?;
    if stored_comments.is_empty() {
        return Err(ApiError::BadRequest(format!("video {} has no comments", video_id)));
    }

    let existing = predictions::count_predictions(pool, video_id).await?;
    let replace = match policy {
        PredictionPolicy::Reject if existing > 0 => {
            return Err(ApiError::Conflict(format!(
                "video {} already has {} predictions (analysis.prediction_policy = reject)",
                video_id, existing
            )));
        }
        PredictionPolicy::Replace => true,
        PredictionPolicy::Reject | PredictionPolicy::Append => false,
    };

    let training_rows = preprocessed::list_preprocessed_training(pool).await?;
    if training_rows.is_empty() {
        return Err(ApiError::BadRequest(
            "training data has not been preprocessed".to_string(),
        ));
    }
    let (texts, labels): (Vec<String>, Vec<String>) = training_rows
        .into_iter()
        .map(|row| (row.text, row.sentiment))
        .unzip();

    // Training, cleaning and prediction are CPU-bound
    let classifier = classifier.clone();
    let preprocessor = Arc::clone(preprocessor);
    let comment_texts: Vec<String> = stored_comments.iter().map(|c| c.comment.clone()).collect();
    let (predicted, evaluation) = tokio::task::spawn_blocking(move || {
        let outcome = classifier.train(&texts, &labels)?;
        let cleaned = preprocessor.preprocess_texts(comment_texts.iter().map(|t| Some(t.as_str())));
        Ok::<_, ClassifierError>((outcome.model.predict(&cleaned), outcome.evaluation))
    })
    .await??;

    let rows: Vec<(i64, String)> = stored_comments
        .iter()
        .map(|c| c.comment_id)
        .zip(predicted)
        .collect();

    let run_id = Uuid::new_v4();
    let stored = predictions::store_predictions(pool, video_id, run_id, &rows, replace).await?;

    info!(
        video_id = %video_id,
        run_id = %run_id,
        predictions = stored,
        policy = %policy,
        accuracy = evaluation.accuracy,
        "Analysis complete"
    );

    Ok(AnalysisOutcome {
        run_id,
        predictions: stored,
        replaced: replace && existing > 0,
        evaluation,
    })
}

/// Stored predictions of a video with their distribution and confusion matrix
pub async fn build_report(pool: &SqlitePool, video_id: &str) -> ApiResult<AnalysisReport> {
    let video = require_video(pool, video_id).await?;
    let rows = predictions::list_predictions(pool, video_id).await?;

    let mut distribution = BTreeMap::new();
    for row in &rows {
        *distribution.entry(row.predict_sentiment.clone()).or_insert(0) += 1;
    }
    let confusion_matrix = confusion_matrix(&rows);

    Ok(AnalysisReport {
        video,
        predictions: rows,
        distribution,
        confusion_matrix,
    })
}

/// Rows without a manual label are left out.
pub fn confusion_matrix(rows: &[PredictionRow]) -> ConfusionMatrix {
    let labeled: Vec<(&str, &str)> = rows
        .iter()
        .filter_map(|row| {
            row.sentiment
                .as_deref()
                .map(|truth| (truth, row.predict_sentiment.as_str()))
        })
        .collect();

    let true_labels: Vec<String> = labeled
        .iter()
        .map(|(truth, _)| *truth)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let predicted_labels: Vec<String> = labeled
        .iter()
        .map(|(_, predicted)| *predicted)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut counts = vec![vec![0; predicted_labels.len()]; true_labels.len()];
    for (truth, predicted) in labeled {
        let i = true_labels.iter().position(|l| l == truth);
        let j = predicted_labels.iter().position(|l| l == predicted);
        if let (Some(i), Some(j)) = (i, j) {
            counts[i][j] += 1;
        }
    }

    ConfusionMatrix {
        true_labels,
        predicted_labels,
        counts,
    }
}
