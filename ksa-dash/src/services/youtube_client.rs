//! YouTube Data API v3 client
//!
//! Two calls: video details (`videos?part=snippet`) and top-level comments
//! (`commentThreads?part=snippet`), the latter following `nextPageToken`
//! until the stream ends or the requested cap is reached.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const USER_AGENT: &str = concat!("ksa-dash/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// API maximum for `maxResults` on commentThreads
const MAX_PAGE_SIZE: usize = 100;

/// YouTube client errors
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Video not found: {0}")]
    NotFound(String),

    #[error("YouTube quota or rate limit exceeded")]
    RateLimited,

    #[error("YouTube temporarily unavailable (HTTP {0})")]
    Unavailable(u16),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl YouTubeError {
    /// Whether the same request may succeed later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            YouTubeError::Network(_) | YouTubeError::RateLimited | YouTubeError::Unavailable(_)
        )
    }
}

/// Title and thumbnail of a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub title: String,
    pub thumbnail_url: String,
}

/// One top-level comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledComment {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    #[serde(rename = "default")]
    fallback: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
    author_display_name: String,
}

/// YouTube Data API client
pub struct YouTubeClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, YouTubeError> {
        Self::with_base_url(api_key, YOUTUBE_BASE_URL)
    }

    /// Client against a different API root (tests, proxies)
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, YouTubeError> {
        Self::with_timeout(api_key, base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, YouTubeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| YouTubeError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Fetch title and high-resolution thumbnail
    pub async fn get_video_details(&self, video_id: &str) -> Result<VideoDetails, YouTubeError> {
        let url = format!("{}/videos", self.base_url);
        debug!(video_id = %video_id, "Querying YouTube video details");

        let response = self
            .http_client
            .get(&url)
            .query(&[("part", "snippet"), ("id", video_id), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| YouTubeError::Network(e.to_string()))?;

        let body: VideoListResponse = Self::parse_response(response, video_id).await?;

        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| YouTubeError::NotFound(video_id.to_string()))?;

        let thumbnails = item.snippet.thumbnails;
        let thumbnail = thumbnails
            .high
            .or(thumbnails.medium)
            .or(thumbnails.fallback)
            .ok_or_else(|| YouTubeError::Parse(format!("video {} has no thumbnail", video_id)))?;

        Ok(VideoDetails {
            title: item.snippet.title,
            thumbnail_url: thumbnail.url,
        })
    }

    /// Fetch up to `max_comments` top-level comments in API order.
    ///
    /// A video with comments disabled yields an empty list.
    pub async fn get_comments(
        &self,
        video_id: &str,
        max_comments: usize,
    ) -> Result<Vec<CrawledComment>, YouTubeError> {
        let url = format!("{}/commentThreads", self.base_url);
        let page_size = max_comments.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        while comments.len() < max_comments {
            debug!(video_id = %video_id, fetched = comments.len(), "Requesting comment page");
            let response = {
                let mut query = vec![
                    ("part", "snippet"),
                    ("videoId", video_id),
                    ("maxResults", page_size.as_str()),
                    ("key", self.api_key.as_str()),
                ];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                self.http_client.get(&url).query(&query).send().await
            }
            .map_err(|e| YouTubeError::Network(e.to_string()))?;

            let page: CommentThreadListResponse =
                match Self::parse_response(response, video_id).await {
                    Err(YouTubeError::Api(403, body)) if body.contains("commentsDisabled") => {
                        warn!(video_id = %video_id, "Comments are disabled for this video");
                        break;
                    }
                    other => other?,
                };

            comments.extend(page.items.into_iter().map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                CrawledComment {
                    text: snippet.text_display,
                    author: snippet.author_display_name,
                }
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        comments.truncate(max_comments);
        Ok(comments)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        video_id: &str,
    ) -> Result<T, YouTubeError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| YouTubeError::Parse(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();

        match status.as_u16() {
            404 => Err(YouTubeError::NotFound(video_id.to_string())),
            429 => Err(YouTubeError::RateLimited),
            403 if error_text.contains("quotaExceeded") || error_text.contains("rateLimitExceeded") => {
                Err(YouTubeError::RateLimited)
            }
            code @ (500 | 502 | 503 | 504) => Err(YouTubeError::Unavailable(code)),
            code => Err(YouTubeError::Api(code, error_text)),
        }
    }
}
