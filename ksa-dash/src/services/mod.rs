//! External collaborators: the YouTube API and uploaded CSV files

pub mod label_import;
pub mod youtube_client;

pub use label_import::{parse_label_csv, parse_training_csv, ImportError, LabelRow, TrainingRow};
pub use youtube_client::{CrawledComment, VideoDetails, YouTubeClient, YouTubeError};
