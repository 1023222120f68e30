//! # KSA Common Library
//!
//! Shared code for the KSA sentiment dashboard:
//! - Error type used across crates
//! - Configuration loading (root folder, TOML bootstrap, API key)
//! - SQLite pool initialization and schema creation

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
