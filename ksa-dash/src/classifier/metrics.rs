//! Evaluation helpers: seeded hold-out split, classification report and
//! stratified k-fold assignment.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Shuffle `0..n` with `seed` and hold out the first `ceil(fraction * n)`.
///
/// Returns `(train, validation)` index lists.
pub fn train_validation_split(n: usize, fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_validation = validation_size(n, fraction);
    let train = indices.split_off(n_validation);
    (train, indices)
}

pub fn validation_size(n: usize, fraction: f64) -> usize {
    ((fraction * n as f64).ceil() as usize).min(n)
}

pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Per-class scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// Precision/recall/F1 per label plus accuracy and averages.
///
/// Serializes flat: one key per label, then `accuracy`, `macro avg` and
/// `weighted avg`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    #[serde(flatten)]
    pub classes: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Build the report over every label seen in either `y_true` or `y_pred`.
///
/// Zero denominators score 0.
pub fn classification_report(y_true: &[String], y_pred: &[String]) -> ClassificationReport {
    let labels: BTreeSet<&str> = y_true
        .iter()
        .chain(y_pred.iter())
        .map(String::as_str)
        .collect();

    let mut classes = BTreeMap::new();
    for label in &labels {
        let true_positive = y_true
            .iter()
            .zip(y_pred)
            .filter(|(t, p)| t == label && p == label)
            .count();
        let predicted = y_pred.iter().filter(|p| p == label).count();
        let support = y_true.iter().filter(|t| t == label).count();

        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        classes.insert(
            label.to_string(),
            ClassMetrics {
                precision,
                recall,
                f1_score: f1(precision, recall),
                support,
            },
        );
    }

    let total_support: usize = classes.values().map(|m| m.support).sum();
    let class_count = classes.len().max(1) as f64;
    let average = |weight: &dyn Fn(&ClassMetrics) -> f64, divisor: f64| ClassMetrics {
        precision: classes.values().map(|m| m.precision * weight(m)).sum::<f64>() / divisor,
        recall: classes.values().map(|m| m.recall * weight(m)).sum::<f64>() / divisor,
        f1_score: classes.values().map(|m| m.f1_score * weight(m)).sum::<f64>() / divisor,
        support: total_support,
    };

    let macro_avg = average(&|_: &ClassMetrics| 1.0, class_count);
    let weighted_avg = if total_support == 0 {
        ClassMetrics {
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            support: 0,
        }
    } else {
        average(&|m: &ClassMetrics| m.support as f64, total_support as f64)
    };

    ClassificationReport {
        accuracy: accuracy(y_true, y_pred),
        classes,
        macro_avg,
        weighted_avg,
    }
}

/// Assign each sample to one of `n_folds` test folds, stratified by label.
///
/// Classes are taken in order of first appearance. Samples of each class
/// are dealt out to folds in their input order so that every fold gets
/// a near-equal share of every class. No shuffling.
pub fn stratified_fold_assignment(labels: &[String], n_folds: usize) -> Vec<usize> {
    let mut class_order: Vec<&str> = Vec::new();
    let encoded: Vec<usize> = labels
        .iter()
        .map(|label| match class_order.iter().position(|c| *c == label) {
            Some(index) => index,
            None => {
                class_order.push(label.as_str());
                class_order.len() - 1
            }
        })
        .collect();

    let mut sorted = encoded.clone();
    sorted.sort_unstable();

    // allocation[fold][class]: samples of `class` that land in `fold`
    let n_classes = class_order.len();
    let mut allocation = vec![vec![0usize; n_classes]; n_folds];
    for (position, class) in sorted.iter().enumerate() {
        allocation[position % n_folds][*class] += 1;
    }

    let mut assignment = vec![0usize; labels.len()];
    for class in 0..n_classes {
        let folds = (0..n_folds).flat_map(|fold| std::iter::repeat(fold).take(allocation[fold][class]));
        let members = encoded
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == class)
            .map(|(i, _)| i);
        for (sample, fold) in members.zip(folds) {
            assignment[sample] = fold;
        }
    }
    assignment
}

/// Mean and population standard deviation
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
