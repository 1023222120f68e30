//! Operator actions: crawl, train, review test labels, analyze

pub mod analysis;
pub mod crawl;
pub mod test_data;
pub mod training;

use crate::error::ApiResult;
use crate::nlp::TextPreprocessor;
use std::sync::Arc;

pub use analysis::{analyze_video, build_report, AnalysisOutcome, AnalysisReport, ConfusionMatrix};
pub use crawl::{crawl_video, CrawlOutcome};
pub use test_data::{import_labels, preprocess_video};
pub use training::{
    preprocess_training, upload_training, PreprocessGuard, PreprocessOutcome, PreprocessStatus,
    UploadOutcome,
};

/// Clean `texts` on the blocking pool, preserving length and order
pub(crate) async fn clean_texts(
    preprocessor: &Arc<TextPreprocessor>,
    texts: Vec<String>,
) -> ApiResult<Vec<String>> {
    let preprocessor = Arc::clone(preprocessor);
    let cleaned = tokio::task::spawn_blocking(move || {
        preprocessor.preprocess_texts(texts.iter().map(|text| Some(text.as_str())))
    })
    .await?;
    Ok(cleaned)
}
