//! Tests for root folder and API key resolution
//!
//! Tests that manipulate KSA_* environment variables are marked #[serial]
//! so they never run in parallel with each other.

use ksa_common::config::{
    resolve_root_folder, resolve_youtube_api_key, RootFolderInitializer, TomlConfig,
    ROOT_FOLDER_ENV, YOUTUBE_API_KEY_ENV, YOUTUBE_API_KEY_ENV_FALLBACK,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(YOUTUBE_API_KEY_ENV);
    env::remove_var(YOUTUBE_API_KEY_ENV_FALLBACK);
}

#[test]
#[serial]
fn test_cli_argument_wins() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), &config);
    assert_eq!(resolved, PathBuf::from("/from/cli"));
    clear_env();
}

#[test]
#[serial]
fn test_env_beats_toml() {
    clear_env();
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };

    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/env"));
    clear_env();
}

#[test]
#[serial]
fn test_toml_then_default() {
    clear_env();
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..TomlConfig::default()
    };
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/toml"));

    let fallback = resolve_root_folder(None, &TomlConfig::default());
    assert!(fallback.ends_with("ksa") || fallback.ends_with("ksa_data"));
}

#[test]
#[serial]
fn test_api_key_priority() {
    clear_env();
    let config = TomlConfig {
        youtube_api_key: Some("toml-key".to_string()),
        ..TomlConfig::default()
    };
    assert_eq!(resolve_youtube_api_key(&config), Some("toml-key".to_string()));

    env::set_var(YOUTUBE_API_KEY_ENV_FALLBACK, "legacy-key");
    assert_eq!(resolve_youtube_api_key(&config), Some("legacy-key".to_string()));

    env::set_var(YOUTUBE_API_KEY_ENV, "env-key");
    assert_eq!(resolve_youtube_api_key(&config), Some("env-key".to_string()));

    clear_env();
    assert_eq!(resolve_youtube_api_key(&TomlConfig::default()), None);
}

#[test]
#[serial]
fn test_whitespace_key_ignored() {
    clear_env();
    env::set_var(YOUTUBE_API_KEY_ENV, "   ");
    assert_eq!(resolve_youtube_api_key(&TomlConfig::default()), None);
    clear_env();
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = 5999\n[analysis]\nneighbors = 7\n").unwrap();

    let config = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.port, Some(5999));
    assert_eq!(config.analysis.neighbors, 7);
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = TomlConfig::load_or_default(Some(&dir.path().join("absent.toml")));
    assert!(result.is_err());
}

#[test]
fn test_initializer_creates_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b");
    let init = RootFolderInitializer::new(root.clone());

    init.ensure_directory_exists().unwrap();
    assert!(root.is_dir());
    assert_eq!(init.database_path(), root.join("ksa.db"));
}
