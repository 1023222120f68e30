//! CSV label import
//!
//! Two formats, both with a header row and any extra columns ignored:
//! - training upload: `comment`, `sentiment`
//! - label correction: `comment_id`, `sentiment`
//!
//! Parsing validates the whole file before anything is returned, so a bad
//! file never leads to a partial import.

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Errors rejecting an uploaded CSV
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Row {row}: sentiment is empty")]
    EmptySentiment { row: usize },

    #[error("Row {row}: comment_id '{value}' is not an integer")]
    InvalidCommentId { row: usize, value: String },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ImportError {
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// One labeled training example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingRow {
    pub comment: String,
    pub sentiment: String,
}

/// One manual label for a crawled comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub comment_id: i64,
    pub sentiment: String,
}

#[derive(Debug, Deserialize)]
struct TrainingRecord {
    #[serde(default)]
    comment: String,
    #[serde(default)]
    sentiment: String,
}

#[derive(Debug, Deserialize)]
struct LabelRecord {
    #[serde(default)]
    comment_id: String,
    #[serde(default)]
    sentiment: String,
}

/// Parse a training upload (`comment`, `sentiment`)
///
/// The comment text is kept exactly as uploaded.
pub fn parse_training_csv(data: &[u8]) -> Result<Vec<TrainingRow>, ImportError> {
    read_records::<TrainingRecord>(data, &["comment", "sentiment"])?
        .into_iter()
        .map(|(row, record)| {
            Ok(TrainingRow {
                sentiment: required_sentiment(row, &record.sentiment)?,
                comment: record.comment,
            })
        })
        .collect()
}

/// Parse a label correction upload (`comment_id`, `sentiment`)
pub fn parse_label_csv(data: &[u8]) -> Result<Vec<LabelRow>, ImportError> {
    read_records::<LabelRecord>(data, &["comment_id", "sentiment"])?
        .into_iter()
        .map(|(row, record)| {
            let raw_id = record.comment_id.trim();
            let comment_id = raw_id
                .parse::<i64>()
                .map_err(|_| ImportError::InvalidCommentId {
                    row,
                    value: raw_id.to_string(),
                })?;
            Ok(LabelRow {
                comment_id,
                sentiment: required_sentiment(row, &record.sentiment)?,
            })
        })
        .collect()
}

fn required_sentiment(row: usize, value: &str) -> Result<String, ImportError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ImportError::EmptySentiment { row })
    } else {
        Ok(value.to_string())
    }
}

/// Check the header for `required` columns, then deserialize every
/// non-blank record.
///
/// Each record comes back with its 1-based data row number (header excluded).
fn read_records<T: DeserializeOwned>(
    data: &[u8],
    required: &[&str],
) -> Result<Vec<(usize, T)>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(data);

    // Spreadsheet exports often start with a byte-order mark
    let headers: StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns { missing });
    }

    let mut records = Vec::new();
    for (position, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        records.push((position + 1, record.deserialize(Some(&headers))?));
    }
    Ok(records)
}
