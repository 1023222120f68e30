//! Per-table query modules
//!
//! Schema creation lives in `ksa_common::db`. Multi-row writes here run in a
//! single transaction each.

pub mod comments;
pub mod predictions;
pub mod preprocessed;
pub mod training;
pub mod videos;

pub use comments::{Comment, LabelUpdate};
pub use predictions::PredictionRow;
pub use preprocessed::{PreprocessedTest, PreprocessedTraining};
pub use training::TrainingExample;
pub use videos::{Video, VideoSummary};
