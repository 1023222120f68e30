//! Video table operations

use ksa_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

/// Crawled video
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Video plus per-stage row counts, for the video picker
#[derive(Debug, Clone, Serialize)]
pub struct VideoSummary {
    #[serde(flatten)]
    pub video: Video,
    pub comments: i64,
    pub labeled_comments: i64,
    pub preprocessed: i64,
    pub predictions: i64,
}

/// Insert a video, or refresh title and thumbnail when it already exists
pub async fn upsert_video(
    pool: &SqlitePool,
    video_id: &str,
    title: &str,
    thumbnail_url: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO video (video_id, title, thumbnail_url, created_at, updated_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(video_id) DO UPDATE SET
            title = excluded.title,
            thumbnail_url = excluded.thumbnail_url,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(video_id)
    .bind(title)
    .bind(thumbnail_url)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_video(pool: &SqlitePool, video_id: &str) -> Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>(
        r#"
        SELECT video_id, title, thumbnail_url, created_at, updated_at
        FROM video
        WHERE video_id = ?
        "#,
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await?;

    Ok(video)
}

/// All videos, oldest crawl first, with row counts per stage
pub async fn list_videos(pool: &SqlitePool) -> Result<Vec<VideoSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT v.video_id, v.title, v.thumbnail_url, v.created_at, v.updated_at,
               (SELECT COUNT(*) FROM comment c WHERE c.video_id = v.video_id) AS comments,
               (SELECT COUNT(*) FROM comment c
                 WHERE c.video_id = v.video_id AND c.sentiment IS NOT NULL) AS labeled_comments,
               (SELECT COUNT(*) FROM preprocessed_test t WHERE t.video_id = v.video_id) AS preprocessed,
               (SELECT COUNT(*) FROM prediction p WHERE p.video_id = v.video_id) AS predictions
        FROM video v
        ORDER BY v.created_at, v.video_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| VideoSummary {
            video: Video {
                video_id: row.get("video_id"),
                title: row.get("title"),
                thumbnail_url: row.get("thumbnail_url"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            },
            comments: row.get("comments"),
            labeled_comments: row.get("labeled_comments"),
            preprocessed: row.get("preprocessed"),
            predictions: row.get("predictions"),
        })
        .collect())
}
