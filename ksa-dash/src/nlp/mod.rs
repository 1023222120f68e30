//! Indonesian text preprocessing

pub mod preprocessor;
pub mod resources;
pub mod stemmer;

pub use preprocessor::TextPreprocessor;
pub use stemmer::{IdentityStemmer, IndonesianStemmer, Stemmer};
