//! K-nearest-neighbours over TF-IDF rows
//!
//! Euclidean distance with uniform votes. Equal vote counts go to the
//! lexicographically smallest label; equal distances keep training order.

use super::tfidf::SparseVector;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    points: Vec<SparseVector>,
    norms: Vec<f64>,
    labels: Vec<String>,
}

impl KnnClassifier {
    /// Store the training rows.
    ///
    /// When fewer than `k` rows are given, every row votes.
    pub fn fit(k: usize, points: Vec<SparseVector>, labels: Vec<String>) -> Self {
        debug_assert_eq!(points.len(), labels.len());

        let effective_k = k.min(points.len()).max(1);
        if effective_k != k {
            debug!(
                requested = k,
                effective = effective_k,
                "Fewer training rows than neighbours, clamping k"
            );
        }

        let norms = points.iter().map(SparseVector::norm_squared).collect();
        Self {
            k: effective_k,
            points,
            norms,
            labels,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Squared Euclidean distance from `query` to training row `index`
    fn distance_squared(&self, query: &SparseVector, query_norm: f64, index: usize) -> f64 {
        (query_norm + self.norms[index] - 2.0 * query.dot(&self.points[index])).max(0.0)
    }

    pub fn predict_one(&self, query: &SparseVector) -> String {
        let query_norm = query.norm_squared();
        let mut ranked: Vec<(f64, usize)> = (0..self.points.len())
            .map(|i| (self.distance_squared(query, query_norm, i), i))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, index) in ranked.iter().take(self.k) {
            *votes.entry(self.labels[*index].as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates labels in order; keep the first maximum
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in votes {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label.to_string()).unwrap_or_default()
    }

    pub fn predict(&self, queries: &[SparseVector]) -> Vec<String> {
        queries.iter().map(|q| self.predict_one(q)).collect()
    }
}
