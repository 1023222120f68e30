//! Crawl a video's details and comments into the store

use crate::db::{comments, videos, Comment, Video};
use crate::error::{ApiError, ApiResult};
use crate::services::YouTubeClient;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutcome {
    pub video: Video,
    pub comments_inserted: usize,
    /// Every stored comment of the video, earlier crawls included
    pub comments: Vec<Comment>,
}

/// YouTube ids are URL-safe base64: letters, digits, `-` and `_`
pub fn validate_video_id(video_id: &str) -> ApiResult<&str> {
    let trimmed = video_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest("video_id is required".to_string()));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::BadRequest(format!(
            "video_id '{}' contains invalid characters",
            trimmed
        )));
    }
    Ok(trimmed)
}

/// Fetch details, upsert the video, then append up to `max_comments` comments.
pub async fn crawl_video(
    pool: &SqlitePool,
    youtube: &YouTubeClient,
    video_id: &str,
    max_comments: usize,
) -> ApiResult<CrawlOutcome> {
    let video_id = validate_video_id(video_id)?;
    if max_comments == 0 {
        return Err(ApiError::BadRequest("max_comments must be at least 1".to_string()));
    }

    let details = youtube.get_video_details(video_id).await.map_err(|e| {
        warn!(video_id = %video_id, error = %e, "Fetching video details failed");
        e
    })?;
    videos::upsert_video(pool, video_id, &details.title, &details.thumbnail_url).await?;

    let crawled = youtube.get_comments(video_id, max_comments).await.map_err(|e| {
        warn!(video_id = %video_id, error = %e, "Fetching comments failed");
        e
    })?;
    if crawled.is_empty() {
        warn!(video_id = %video_id, "No comments found");
    }
    let inserted = comments::insert_comments(pool, video_id, &crawled).await?;

    let video = videos::get_video(pool, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("video {}", video_id)))?;
    let stored = comments::list_comments(pool, video_id).await?;

    info!(video_id = %video_id, inserted, total = stored.len(), "Crawl complete");
    Ok(CrawlOutcome {
        video,
        comments_inserted: inserted,
        comments: stored,
    })
}
