//! Stopword and slang dictionary loading
//!
//! Resource files live in one directory:
//! - `stopwords.txt`: one word per line, no header
//! - `slang-words.csv`: columns `kataAlay`, `kataBaik`
//! - `colloquial-indonesian-lexicon.csv`: columns `slang`, `formal` (others ignored)
//!
//! The public loaders never fail. A missing or malformed file is logged at
//! error level and the affected vocabulary comes back empty.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use stop_words::LANGUAGE;
use thiserror::Error;
use tracing::{error, info};

pub const STOPWORDS_FILE: &str = "stopwords.txt";
pub const SLANG_WORDS_FILE: &str = "slang-words.csv";
pub const COLLOQUIAL_LEXICON_FILE: &str = "colloquial-indonesian-lexicon.csv";

/// Errors reading a single resource file
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

/// Indonesian list from the `stop-words` crate
pub fn builtin_stopwords() -> HashSet<String> {
    stop_words::get(LANGUAGE::Indonesian)
        .iter()
        .map(|w| w.to_string())
        .collect()
}

/// Built-in stopwords plus the words in `stopwords.txt`.
///
/// When the file cannot be read the whole set is empty, built-in words
/// included.
pub fn load_stopwords(dir: &Path) -> HashSet<String> {
    let path = dir.join(STOPWORDS_FILE);
    match read_word_list(&path) {
        Ok(extra) => {
            let mut stopwords = builtin_stopwords();
            let extra_count = extra.len();
            stopwords.extend(extra);
            info!(
                "Loaded {} stopwords ({} from {})",
                stopwords.len(),
                extra_count,
                path.display()
            );
            stopwords
        }
        Err(e) => {
            error!("Stopword loading failed, continuing without stopwords: {}", e);
            HashSet::new()
        }
    }
}

/// Merged slang-to-formal mapping.
///
/// Entries from the colloquial lexicon override `slang-words.csv`. When
/// either file cannot be read the mapping is empty.
pub fn load_slang_dictionary(dir: &Path) -> HashMap<String, String> {
    let slang_words = dir.join(SLANG_WORDS_FILE);
    let lexicon = dir.join(COLLOQUIAL_LEXICON_FILE);

    let loaded = read_slang_table(&slang_words, "kataAlay", "kataBaik", DuplicateKey::LastWins)
        .and_then(|first| {
            let second =
                read_slang_table(&lexicon, "slang", "formal", DuplicateKey::FirstWins)?;
            Ok((first, second))
        });

    match loaded {
        Ok((mut mapping, overrides)) => {
            mapping.extend(overrides);
            info!("Loaded {} slang mappings", mapping.len());
            mapping
        }
        Err(e) => {
            error!("Slang dictionary loading failed, continuing without slang mapping: {}", e);
            HashMap::new()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DuplicateKey {
    FirstWins,
    LastWins,
}

fn read_word_list(path: &Path) -> Result<Vec<String>, ResourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ResourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut words = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ResourceError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(word) = record.get(0).map(str::trim).filter(|w| !w.is_empty()) {
            words.push(word.to_string());
        }
    }
    Ok(words)
}

fn read_slang_table(
    path: &Path,
    key_column: &str,
    value_column: &str,
    duplicates: DuplicateKey,
) -> Result<HashMap<String, String>, ResourceError> {
    let csv_error = |source| ResourceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers = reader.headers().map_err(csv_error)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ResourceError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let key_idx = column(key_column)?;
    let value_idx = column(value_column)?;

    let mut mapping = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let key = record.get(key_idx).map(str::trim).unwrap_or_default();
        let value = record.get(value_idx).map(str::trim).unwrap_or_default();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        match duplicates {
            DuplicateKey::LastWins => {
                mapping.insert(key.to_string(), value.to_string());
            }
            DuplicateKey::FirstWins => {
                mapping
                    .entry(key.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
    }
    Ok(mapping)
}
