//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from a small TOML file. Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `KSA_ROOT_FOLDER`
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "KSA_ROOT_FOLDER";

/// Environment variable holding the YouTube Data API key
pub const YOUTUBE_API_KEY_ENV: &str = "KSA_YOUTUBE_API_KEY";

/// Unprefixed fallback accepted for the YouTube key
pub const YOUTUBE_API_KEY_ENV_FALLBACK: &str = "YOUTUBE_API_KEY";

/// Default HTTP port for ksa-dash
pub const DEFAULT_PORT: u16 = 5780;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "ksa.db";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; a missing file yields `TomlConfig::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and resources
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Directory holding stopwords.txt and the slang dictionaries
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,

    /// YouTube Data API v3 key
    #[serde(default)]
    pub youtube_api_key: Option<String>,

    /// Override for the YouTube Data API base URL
    #[serde(default)]
    pub youtube_base_url: Option<String>,

    /// YouTube request timeout in seconds
    #[serde(default)]
    pub youtube_timeout_secs: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Classifier and analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Preprocessing guard configuration
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// What an analysis run does when the video already has predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionPolicy {
    /// Refuse the run
    #[default]
    Reject,
    /// Delete the previous predictions for the video, then insert
    Replace,
    /// Insert alongside earlier runs
    Append,
}

impl std::fmt::Display for PredictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PredictionPolicy::Reject => "reject",
            PredictionPolicy::Replace => "replace",
            PredictionPolicy::Append => "append",
        };
        f.write_str(name)
    }
}

/// Classifier and crawl parameters
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Number of neighbours consulted by the KNN classifier
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Seed for the train/validation shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Fraction of labeled rows held out for validation
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,

    /// Number of cross-validation folds
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,

    /// Comment cap per crawl
    #[serde(default = "default_max_comments")]
    pub max_comments: usize,

    /// Behaviour when predictions already exist for a video
    #[serde(default)]
    pub prediction_policy: PredictionPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            neighbors: default_neighbors(),
            seed: default_seed(),
            validation_fraction: default_validation_fraction(),
            cv_folds: default_cv_folds(),
            max_comments: default_max_comments(),
            prediction_policy: PredictionPolicy::default(),
        }
    }
}

fn default_neighbors() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_validation_fraction() -> f64 {
    0.2
}

fn default_cv_folds() -> usize {
    5
}

fn default_max_comments() -> usize {
    100
}

/// Preprocessing guard configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreprocessingConfig {
    /// Allow `force=true` to discard and recompute preprocessed rows
    #[serde(default)]
    pub allow_rerun: bool,
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the platform config location.
    ///
    /// A missing default file is not an error; an explicit path that is
    /// missing or malformed is.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.neighbors == 0 {
            return Err(Error::Config("analysis.neighbors must be at least 1".to_string()));
        }
        if !(analysis.validation_fraction > 0.0 && analysis.validation_fraction < 1.0) {
            return Err(Error::Config(format!(
                "analysis.validation_fraction must be in (0, 1), got {}",
                analysis.validation_fraction
            )));
        }
        if analysis.cv_folds < 2 {
            return Err(Error::Config("analysis.cv_folds must be at least 2".to_string()));
        }
        if analysis.max_comments == 0 {
            return Err(Error::Config("analysis.max_comments must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Get the configuration file path for the platform, if one exists
///
/// Checks `<config_dir>/ksa/config.toml`, then `/etc/ksa/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("ksa").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ksa/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ksa"))
        .unwrap_or_else(|| PathBuf::from("./ksa_data"))
}

/// Creates the root folder and derives paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder if it is missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// `<root>/ksa.db`
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    /// Resources directory: TOML override, else `<root>/resources`
    pub fn resources_dir(&self, toml_config: &TomlConfig) -> PathBuf {
        toml_config
            .resources_dir
            .clone()
            .unwrap_or_else(|| self.root_folder.join("resources"))
    }
}

/// Resolve the YouTube API key
///
/// **Priority:** ENV (`KSA_YOUTUBE_API_KEY`, then `YOUTUBE_API_KEY`) → TOML.
/// Returns `None` when no source holds a usable key; crawling then fails
/// per request instead of at startup.
pub fn resolve_youtube_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = [YOUTUBE_API_KEY_ENV, YOUTUBE_API_KEY_ENV_FALLBACK]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|key| is_valid_key(key));

    let toml_key = toml_config
        .youtube_api_key
        .as_ref()
        .filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!("YouTube API key found in environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key {
        info!("YouTube API key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("YouTube API key loaded from TOML config");
        return Some(key.clone());
    }

    warn!("YouTube API key not configured; crawling is disabled until {} is set", YOUTUBE_API_KEY_ENV);
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
