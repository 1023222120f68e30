//! Comment table operations

use crate::services::label_import::LabelRow;
use crate::services::youtube_client::CrawledComment;
use ksa_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Crawled comment with its optional manual label
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: i64,
    pub video_id: String,
    pub comment: String,
    pub sender: String,
    pub sentiment: Option<String>,
}

/// Outcome of a label correction upload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelUpdate {
    pub updated: usize,
    /// Ids that do not belong to the video (or do not exist)
    pub unmatched: Vec<i64>,
}

/// Store crawled comments for a video in one transaction. Labels start null.
pub async fn insert_comments(
    pool: &SqlitePool,
    video_id: &str,
    comments: &[CrawledComment],
) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for comment in comments {
        sqlx::query("INSERT INTO comment (video_id, comment, sender) VALUES (?, ?, ?)")
            .bind(video_id)
            .bind(&comment.text)
            .bind(&comment.author)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(comments.len())
}

/// Comments of a video in crawl order
pub async fn list_comments(pool: &SqlitePool, video_id: &str) -> Result<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT comment_id, video_id, comment, sender, sentiment
        FROM comment
        WHERE video_id = ?
        ORDER BY comment_id
        "#,
    )
    .bind(video_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

/// Apply manual labels to comments of `video_id` in one transaction.
///
/// Ids belonging to another video are left alone and reported as unmatched.
pub async fn apply_labels(
    pool: &SqlitePool,
    video_id: &str,
    labels: &[LabelRow],
) -> Result<LabelUpdate> {
    let mut tx = pool.begin().await?;
    let mut outcome = LabelUpdate::default();

    for label in labels {
        let result = sqlx::query("UPDATE comment SET sentiment = ? WHERE comment_id = ? AND video_id = ?")
            .bind(&label.sentiment)
            .bind(label.comment_id)
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            outcome.unmatched.push(label.comment_id);
        } else {
            outcome.updated += 1;
        }
    }

    tx.commit().await?;
    Ok(outcome)
}
