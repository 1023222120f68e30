//! ksa-dash library interface
//!
//! Crawls YouTube comments, cleans Indonesian text, trains a TF-IDF + KNN
//! sentiment classifier and serves a small dashboard over the results.

pub mod api;
pub mod classifier;
pub mod db;
pub mod error;
pub mod nlp;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use ksa_common::config::{AnalysisConfig, PreprocessingConfig};
use nlp::TextPreprocessor;
use services::YouTubeClient;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Built once at startup from the resource files
    pub preprocessor: Arc<TextPreprocessor>,
    /// `None` when no API key is configured; crawling then answers 503
    pub youtube: Option<Arc<YouTubeClient>>,
    pub analysis: AnalysisConfig,
    pub preprocessing: PreprocessingConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, preprocessor: TextPreprocessor, youtube: Option<YouTubeClient>) -> Self {
        Self {
            db,
            preprocessor: Arc::new(preprocessor),
            youtube: youtube.map(Arc::new),
            analysis: AnalysisConfig::default(),
            preprocessing: PreprocessingConfig::default(),
            startup_time: Utc::now(),
        }
    }

    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .merge(api::crawl_routes())
        .merge(api::video_routes())
        .merge(api::training_routes())
        .merge(api::analysis_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
