//! TF-IDF + KNN sentiment classifier
//!
//! `SentimentClassifier` is plain configuration. `train` vectorizes the
//! corpus, fits KNN on a seeded 80/20 split, scores the held-out part and
//! runs stratified k-fold cross-validation over the whole corpus. The
//! fitted vectorizer and classifier come back as a [`FittedModel`], which is
//! the only thing that can `predict`.

pub mod knn;
pub mod metrics;
pub mod tfidf;

use knn::KnnClassifier;
use ksa_common::config::AnalysisConfig;
use metrics::{
    accuracy, classification_report, mean_std, stratified_fold_assignment,
    train_validation_split, ClassificationReport,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tfidf::{SparseVector, TfidfVectorizer};
use thiserror::Error;
use tracing::{debug, info};

/// Reasons training refuses a corpus
#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("Need at least {required} labeled examples, found {found}")]
    TooFewExamples { required: usize, found: usize },

    #[error("Got {texts} texts but {labels} labels")]
    LengthMismatch { texts: usize, labels: usize },

    #[error("Need at least two distinct labels, found {found}")]
    SingleLabel { found: usize },

    #[error("All texts are empty after preprocessing; no features to learn from")]
    EmptyVocabulary,
}

impl ClassifierError {
    /// Training data problems do not go away on retry
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Cross-validation accuracy summary
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidation {
    pub folds: usize,
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

/// Scores reported by a training run
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub cross_validation: CrossValidation,
    pub training_examples: usize,
    pub validation_examples: usize,
    pub vocabulary_size: usize,
}

/// Result of [`SentimentClassifier::train`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: FittedModel,
    pub evaluation: Evaluation,
}

/// Fitted vectorizer plus the KNN fitted on the training split
#[derive(Debug, Clone)]
pub struct FittedModel {
    vectorizer: TfidfVectorizer,
    knn: KnnClassifier,
}

impl FittedModel {
    /// One label per text, in input order
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        let vectors = self.vectorizer.transform(texts);
        self.knn.predict(&vectors)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

/// Classifier configuration
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    pub neighbors: usize,
    pub seed: u64,
    pub validation_fraction: f64,
    pub cv_folds: usize,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self {
            neighbors: 5,
            seed: 42,
            validation_fraction: 0.2,
            cv_folds: 5,
        }
    }
}

impl From<&AnalysisConfig> for SentimentClassifier {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            neighbors: config.neighbors,
            seed: config.seed,
            validation_fraction: config.validation_fraction,
            cv_folds: config.cv_folds,
        }
    }
}

fn select<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}

impl SentimentClassifier {
    pub fn new(neighbors: usize) -> Self {
        Self {
            neighbors,
            ..Self::default()
        }
    }

    pub fn train(
        &self,
        texts: &[String],
        labels: &[String],
    ) -> Result<TrainingOutcome, ClassifierError> {
        self.check_corpus(texts, labels)?;

        let vectorizer = TfidfVectorizer::fit(texts);
        if vectorizer.vocabulary_size() == 0 {
            return Err(ClassifierError::EmptyVocabulary);
        }
        let vectors = vectorizer.transform(texts);

        let (train_idx, validation_idx) =
            train_validation_split(texts.len(), self.validation_fraction, self.seed);
        if train_idx.is_empty() || validation_idx.is_empty() {
            return Err(ClassifierError::TooFewExamples {
                required: self.neighbors + 1,
                found: texts.len(),
            });
        }

        let knn = KnnClassifier::fit(
            self.neighbors,
            select(&vectors, &train_idx),
            select(labels, &train_idx),
        );

        let y_validation = select(labels, &validation_idx);
        let y_predicted = knn.predict(&select(&vectors, &validation_idx));
        let validation_accuracy = accuracy(&y_validation, &y_predicted);
        let report = classification_report(&y_validation, &y_predicted);

        let cross_validation = self.cross_validate(&vectors, labels);

        info!(
            examples = texts.len(),
            vocabulary = vectorizer.vocabulary_size(),
            accuracy = validation_accuracy,
            cv_mean = cross_validation.mean,
            "Classifier trained"
        );

        Ok(TrainingOutcome {
            evaluation: Evaluation {
                accuracy: validation_accuracy,
                report,
                cross_validation,
                training_examples: train_idx.len(),
                validation_examples: validation_idx.len(),
                vocabulary_size: vectorizer.vocabulary_size(),
            },
            model: FittedModel { vectorizer, knn },
        })
    }

    fn check_corpus(&self, texts: &[String], labels: &[String]) -> Result<(), ClassifierError> {
        if texts.len() != labels.len() {
            return Err(ClassifierError::LengthMismatch {
                texts: texts.len(),
                labels: labels.len(),
            });
        }

        let required = self.neighbors + 1;
        if texts.len() < required {
            return Err(ClassifierError::TooFewExamples {
                required,
                found: texts.len(),
            });
        }

        let distinct: BTreeSet<&String> = labels.iter().collect();
        if distinct.len() < 2 {
            return Err(ClassifierError::SingleLabel {
                found: distinct.len(),
            });
        }

        Ok(())
    }

    /// Stratified k-fold accuracy of a fresh KNN over the full corpus
    fn cross_validate(
        &self,
        vectors: &[SparseVector],
        labels: &[String],
    ) -> CrossValidation {
        let largest_class = {
            let distinct: BTreeSet<&String> = labels.iter().collect();
            distinct
                .iter()
                .map(|label| labels.iter().filter(|l| l == label).count())
                .max()
                .unwrap_or(0)
        };
        let folds = self.effective_folds(labels.len(), largest_class);
        if folds != self.cv_folds {
            debug!(
                configured = self.cv_folds,
                folds,
                largest_class,
                "Too few examples per label, reducing cross-validation folds"
            );
        }

        let assignment = stratified_fold_assignment(labels, folds);
        let mut scores = Vec::with_capacity(folds);
        for fold in 0..folds {
            let (test_idx, train_idx): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&i| assignment[i] == fold);

            let knn = KnnClassifier::fit(
                self.neighbors,
                select(vectors, &train_idx),
                select(labels, &train_idx),
            );
            let predicted = knn.predict(&select(vectors, &test_idx));
            let score = accuracy(&select(labels, &test_idx), &predicted);
            debug!(fold, score, test_rows = test_idx.len(), "Cross-validation fold scored");
            scores.push(score);
        }

        let (mean, std) = mean_std(&scores);
        CrossValidation {
            folds,
            scores,
            mean,
            std,
        }
    }

    /// Configured fold count, lowered so the largest label still spreads
    /// over every fold. Never below two.
    fn effective_folds(&self, examples: usize, largest_class: usize) -> usize {
        self.cv_folds.min(largest_class).min(examples).max(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<String>, Vec<String>) {
        let rows = [
            ("bagus keren mantap", "positif"),
            ("keren sekali bagus", "positif"),
            ("mantap suka video", "positif"),
            ("suka bagus keren", "positif"),
            ("mantap keren suka", "positif"),
            ("jelek buruk kecewa", "negatif"),
            ("buruk sekali jelek", "negatif"),
            ("kecewa video jelek", "negatif"),
            ("jelek kecewa buruk", "negatif"),
            ("buruk jelek benci", "negatif"),
        ];
        rows.iter()
            .map(|(t, l)| (t.to_string(), l.to_string()))
            .unzip()
    }

    #[test]
    fn test_train_and_predict() {
        let (texts, labels) = corpus();
        let outcome = SentimentClassifier::default().train(&texts, &labels).unwrap();

        let evaluation = &outcome.evaluation;
        assert!((0.0..=1.0).contains(&evaluation.accuracy));
        assert!((0.0..=1.0).contains(&evaluation.cross_validation.mean));
        assert!(evaluation.cross_validation.std >= 0.0);
        assert_eq!(evaluation.cross_validation.scores.len(), 5);
        assert_eq!(evaluation.validation_examples, 2);

        let predictions = outcome.model.predict(&texts);
        assert_eq!(predictions.len(), texts.len());
        for label in &predictions {
            assert!(label == "positif" || label == "negatif");
        }
    }

    #[test]
    fn test_report_covers_validation_labels() {
        let (texts, labels) = corpus();
        let outcome = SentimentClassifier::default().train(&texts, &labels).unwrap();
        let report = &outcome.evaluation.report;
        let total: usize = report.classes.values().map(|m| m.support).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_clear_signal_predicted() {
        let (texts, labels) = corpus();
        let model = SentimentClassifier::new(3)
            .train(&texts, &labels)
            .unwrap()
            .model;
        let predicted = model.predict(&["jelek buruk kecewa benci", "bagus keren mantap suka"]);
        assert_eq!(predicted, vec!["negatif", "positif"]);
    }

    #[test]
    fn test_too_few_examples() {
        let texts: Vec<String> = vec!["bagus".into(), "jelek".into()];
        let labels: Vec<String> = vec!["positif".into(), "negatif".into()];
        let err = SentimentClassifier::default().train(&texts, &labels).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::TooFewExamples {
                required: 6,
                found: 2
            }
        );
    }

    #[test]
    fn test_single_label_rejected() {
        let (texts, _) = corpus();
        let labels = vec!["positif".to_string(); texts.len()];
        let err = SentimentClassifier::default().train(&texts, &labels).unwrap_err();
        assert_eq!(err, ClassifierError::SingleLabel { found: 1 });
    }

    #[test]
    fn test_empty_texts_rejected() {
        let (_, labels) = corpus();
        let texts = vec![String::new(); labels.len()];
        let err = SentimentClassifier::default().train(&texts, &labels).unwrap_err();
        assert_eq!(err, ClassifierError::EmptyVocabulary);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (texts, mut labels) = corpus();
        labels.pop();
        let err = SentimentClassifier::default().train(&texts, &labels).unwrap_err();
        assert!(matches!(err, ClassifierError::LengthMismatch { texts: 10, labels: 9 }));
    }

    #[test]
    fn test_small_balanced_corpus_trains_with_fewer_folds() {
        let texts: Vec<String> = ["bagus keren", "keren mantap", "mantap bagus", "jelek buruk", "buruk kecewa", "kecewa jelek"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let labels: Vec<String> = ["pos", "pos", "pos", "neg", "neg", "neg"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let outcome = SentimentClassifier::default().train(&texts, &labels).unwrap();
        let cv = &outcome.evaluation.cross_validation;
        assert_eq!(cv.folds, 3);
        assert_eq!(cv.scores.len(), 3);
        assert_eq!(outcome.model.predict(&texts).len(), 6);
    }

    #[test]
    fn test_effective_folds() {
        let classifier = SentimentClassifier::default();
        assert_eq!(classifier.effective_folds(10, 5), 5);
        assert_eq!(classifier.effective_folds(20, 12), 5);
        assert_eq!(classifier.effective_folds(6, 3), 3);
        assert_eq!(classifier.effective_folds(3, 1), 2);
    }

    #[test]
    fn test_minimum_corpus_clamps_k() {
        // K+1 rows leave fewer than K rows in the training split
        let (texts, labels) = corpus();
        let texts = vec![
            texts[0].clone(),
            texts[1].clone(),
            texts[2].clone(),
            texts[5].clone(),
            texts[6].clone(),
            texts[7].clone(),
        ];
        let labels = vec![
            labels[0].clone(),
            labels[1].clone(),
            labels[2].clone(),
            labels[5].clone(),
            labels[6].clone(),
            labels[7].clone(),
        ];
        let classifier = SentimentClassifier {
            cv_folds: 3,
            ..SentimentClassifier::default()
        };
        let outcome = classifier.train(&texts, &labels).unwrap();
        assert_eq!(outcome.evaluation.training_examples, 4);
    }
}
