//! ksa-dash - YouTube comment sentiment dashboard
//!
//! Crawls comments for a video, cleans them with the Indonesian text
//! pipeline and labels them with a TF-IDF + KNN classifier trained on an
//! uploaded corpus.

use anyhow::{Context, Result};
use clap::Parser;
use ksa_common::config::{
    resolve_root_folder, resolve_youtube_api_key, RootFolderInitializer, TomlConfig, DEFAULT_PORT,
};
use ksa_dash::nlp::TextPreprocessor;
use ksa_dash::services::youtube_client::YOUTUBE_BASE_URL;
use ksa_dash::services::YouTubeClient;
use ksa_dash::AppState;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ksa-dash", version, about = "YouTube comment sentiment dashboard")]
struct Args {
    /// Folder holding the database and resource files (overrides KSA_ROOT_FOLDER)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Listen port
    #[arg(long)]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting ksa-dash (sentiment dashboard)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = ksa_common::db::init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let resources_dir = initializer.resources_dir(&toml_config);
    info!("Resources: {}", resources_dir.display());
    let preprocessor = TextPreprocessor::load(&resources_dir);

    let youtube = match resolve_youtube_api_key(&toml_config) {
        Some(key) => {
            let base_url = toml_config
                .youtube_base_url
                .as_deref()
                .unwrap_or(YOUTUBE_BASE_URL);
            let client = match toml_config.youtube_timeout_secs {
                Some(secs) => YouTubeClient::with_timeout(key, base_url, Duration::from_secs(secs)),
                None => YouTubeClient::with_base_url(key, base_url),
            }
            .context("Failed to build YouTube client")?;
            Some(client)
        }
        None => {
            warn!("Crawling disabled: no YouTube API key");
            None
        }
    };

    let state = AppState::new(db_pool, preprocessor, youtube)
        .with_analysis(toml_config.analysis.clone())
        .with_preprocessing(toml_config.preprocessing.clone());
    info!(
        neighbors = state.analysis.neighbors,
        policy = %state.analysis.prediction_policy,
        allow_rerun = state.preprocessing.allow_rerun,
        "Analysis settings"
    );

    let app = ksa_dash::build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
