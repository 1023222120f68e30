//! HTTP API handlers for ksa-dash

pub mod analysis;
pub mod crawl;
pub mod health;
pub mod training;
pub mod ui;
pub mod videos;

pub use analysis::analysis_routes;
pub use crawl::crawl_routes;
pub use health::health_routes;
pub use training::training_routes;
pub use ui::ui_routes;
pub use videos::video_routes;

use serde::Deserialize;

/// `?force=true` on the preprocessing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ForceQuery {
    #[serde(default)]
    pub force: bool,
}
