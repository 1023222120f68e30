//! Comment text cleaning
//!
//! Every comment goes through the same fixed pipeline: lowercase, strip
//! URLs, mentions, hashtags and HTML tags, keep only ASCII letters, map slang
//! to formal words, stem, then drop stopwords and single characters.

use super::resources::{load_slang_dictionary, load_stopwords};
use super::stemmer::{IndonesianStemmer, Stemmer};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").expect("valid URL regex"));
static MENTION_HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(@\w+|#\w+)").expect("valid mention regex"));
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag regex"));
static NON_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").expect("valid letter regex"));

/// Stateless text cleaner holding the loaded vocabularies
pub struct TextPreprocessor {
    stemmer: Box<dyn Stemmer>,
    stopwords: HashSet<String>,
    slang: HashMap<String, String>,
}

impl std::fmt::Debug for TextPreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPreprocessor")
            .field("stemmer", &self.stemmer.name())
            .field("stopwords", &self.stopwords.len())
            .field("slang", &self.slang.len())
            .finish()
    }
}

impl TextPreprocessor {
    /// Load stopwords and slang dictionaries from `resources_dir`.
    ///
    /// Missing resources degrade to empty vocabularies; construction itself
    /// never fails.
    pub fn load(resources_dir: &Path) -> Self {
        Self::from_parts(
            Box::new(IndonesianStemmer::new()),
            load_stopwords(resources_dir),
            load_slang_dictionary(resources_dir),
        )
    }

    /// Build from in-memory vocabularies
    pub fn from_parts(
        stemmer: Box<dyn Stemmer>,
        stopwords: HashSet<String>,
        slang: HashMap<String, String>,
    ) -> Self {
        Self {
            stemmer,
            stopwords,
            slang,
        }
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    pub fn slang_count(&self) -> usize {
        self.slang.len()
    }

    /// Clean one comment. `None` and `""` both yield `""`.
    pub fn clean_text(&self, text: Option<&str>) -> String {
        let text = match text {
            Some(t) if !t.is_empty() => t,
            _ => return String::new(),
        };

        let lowered = text.to_lowercase();
        let no_urls = URL_RE.replace_all(&lowered, "");
        let no_mentions = MENTION_HASHTAG_RE.replace_all(&no_urls, "");
        let no_tags = HTML_TAG_RE.replace_all(&no_mentions, "");
        let letters_only = NON_LETTER_RE.replace_all(&no_tags, "");

        let normalized = letters_only
            .split_whitespace()
            .map(|token| self.slang.get(token).map(String::as_str).unwrap_or(token))
            .collect::<Vec<_>>()
            .join(" ");

        let stemmed = self.stemmer.stem_text(&normalized);

        stemmed
            .split_whitespace()
            .filter(|token| token.chars().count() > 1 && !self.stopwords.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Clean a batch, preserving length and order
    pub fn preprocess_texts<'a, I>(&self, texts: I) -> Vec<String>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        texts.into_iter().map(|text| self.clean_text(text)).collect()
    }
}
