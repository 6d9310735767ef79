//! TF-IDF vectors and cosine similarity against a fixed reference corpus.
//!
//! Terms are lowercase runs of two or more word characters. Weights are raw
//! counts times the smoothed idf `ln((1 + n) / (1 + df)) + 1`, rows are
//! L2-normalised, so cosine similarity is the dot product of two rows.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TERM: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

type TermCounts = HashMap<String, usize>;

/// Count the terms of `text`.
pub fn term_counts(text: &str) -> TermCounts {
    let lower = text.to_lowercase();
    let mut counts = TermCounts::new();
    for m in TERM.find_iter(&lower) {
        *counts.entry(m.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Vectorizer over a fixed reference corpus.
///
/// Reference term counts are computed once. The vocabulary and idf weights
/// are fitted per call over the corpus plus the target, so the vectorizer
/// itself is never mutated.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    corpus: Vec<TermCounts>,
}

impl TfidfVectorizer {
    pub fn new<S: AsRef<str>>(corpus: &[S]) -> Self {
        Self {
            corpus: corpus.iter().map(|t| term_counts(t.as_ref())).collect(),
        }
    }

    /// Number of reference texts.
    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }

    /// Cosine similarity of `target` against every reference text, in
    /// corpus order. `None` when neither the corpus nor the target has a
    /// single term.
    pub fn similarities(&self, target: &str) -> Option<Vec<f64>> {
        let target = term_counts(target);
        let n = (self.corpus.len() + 1) as f64;

        let mut df: HashMap<&str, usize> = HashMap::new();
        for doc in self.corpus.iter().chain(std::iter::once(&target)) {
            for term in doc.keys() {
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if df.is_empty() {
            return None;
        }

        let idf = |term: &str| -> f64 {
            let d = df.get(term).copied().unwrap_or(0) as f64;
            ((1.0 + n) / (1.0 + d)).ln() + 1.0
        };
        let norm = |doc: &TermCounts| -> f64 {
            doc.iter()
                .map(|(t, &c)| (c as f64 * idf(t)).powi(2))
                .sum::<f64>()
                .sqrt()
        };

        let target_norm = norm(&target);
        let scores = self
            .corpus
            .iter()
            .map(|doc| {
                let doc_norm = norm(doc);
                if target_norm == 0.0 || doc_norm == 0.0 {
                    return 0.0;
                }
                let dot: f64 = target
                    .iter()
                    .filter_map(|(t, &c)| doc.get(t).map(|&d| (c * d) as f64 * idf(t).powi(2)))
                    .sum();
                dot / (target_norm * doc_norm)
            })
            .collect();

        Some(scores)
    }
}
