//! Prediction table operations

use ksa_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Prediction joined with its comment
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PredictionRow {
    pub prediction_id: i64,
    pub comment_id: i64,
    pub comment: String,
    /// Manual label, if one was supplied
    pub sentiment: Option<String>,
    pub predict_sentiment: String,
    pub run_id: String,
    pub created_at: String,
}

pub async fn count_predictions(pool: &SqlitePool, video_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM prediction WHERE video_id = ?")
        .bind(video_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Store one run's `(comment_id, label)` pairs in one transaction.
///
/// With `replace` set, earlier predictions for the video are deleted first.
pub async fn store_predictions(
    pool: &SqlitePool,
    video_id: &str,
    run_id: Uuid,
    predictions: &[(i64, String)],
    replace: bool,
) -> Result<usize> {
    let mut tx = pool.begin().await?;

    if replace {
        sqlx::query("DELETE FROM prediction WHERE video_id = ?")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;
    }

    let run_id = run_id.to_string();
    for (comment_id, label) in predictions {
        sqlx::query(
            r#"
            INSERT INTO prediction (predict_sentiment, comment_id, video_id, run_id, created_at)
            VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(label)
        .bind(comment_id)
        .bind(video_id)
        .bind(&run_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(predictions.len())
}

/// Predictions of the video's most recent run, joined with comment text and
/// manual label
pub async fn list_predictions(pool: &SqlitePool, video_id: &str) -> Result<Vec<PredictionRow>> {
    let rows = sqlx::query_as::<_, PredictionRow>(
        r#"
        SELECT p.prediction_id, p.comment_id, c.comment, c.sentiment,
               p.predict_sentiment, p.run_id, p.created_at
        FROM prediction p
        JOIN comment c ON p.comment_id = c.comment_id
        WHERE p.video_id = ?
          AND p.run_id = (
              SELECT run_id FROM prediction
              WHERE video_id = ?
              ORDER BY prediction_id DESC
              LIMIT 1
          )
        ORDER BY p.prediction_id
        "#,
    )
    .bind(video_id)
    .bind(video_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
