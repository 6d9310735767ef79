//! Similarity-threshold matcher over a reference corpus.

use tracing::trace;

use super::tfidf::TfidfVectorizer;
use super::{unit_threshold, Matcher, MatcherKind, TextUnit};
use crate::error::{ConfigError, MatchExecutionError, Result};
use crate::models::result::{Match, ResultRecord};

/// Similarity matcher.
///
/// A unit matches when its best cosine similarity against any reference
/// text is strictly above the threshold. Ties go to the first reference
/// text in corpus order.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    references: Vec<String>,
    threshold: f64,
    vectorizer: TfidfVectorizer,
}

impl SimilarityMatcher {
    /// Create a matcher. The corpus must be non-empty and the threshold in `[0, 1]`.
    pub fn new(question: &str, references: Vec<String>, threshold: f64) -> Result<Self> {
        if references.is_empty() {
            return Err(ConfigError::EmptyCorpus(question.to_string()).into());
        }
        let threshold = unit_threshold(question, threshold)?;
        let vectorizer = TfidfVectorizer::new(&references);

        Ok(Self {
            references,
            threshold,
            vectorizer,
        })
    }

    /// Index and score of the most similar reference text.
    pub fn best_match(&self, unit: &TextUnit<'_>) -> Result<(usize, f64)> {
        if unit.text.trim().is_empty() {
            return Err(MatchExecutionError::EmptyText {
                doc_id: unit.doc_id.to_string(),
                page: unit.page,
            }
            .into());
        }

        let scores = self
            .vectorizer
            .similarities(unit.text)
            .ok_or_else(|| MatchExecutionError::EmptyVocabulary {
                doc_id: unit.doc_id.to_string(),
                page: unit.page,
            })?;

        let mut best = (0, scores[0]);
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > best.1 {
                best = (i, score);
            }
        }
        Ok(best)
    }
}

impl Matcher for SimilarityMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Similarity
    }

    fn analyze(&self, unit: &TextUnit<'_>) -> Result<ResultRecord> {
        let (index, score) = self.best_match(unit)?;
        trace!(doc_id = unit.doc_id, index, score, "best reference");

        if score <= self.threshold {
            return Ok(ResultRecord::empty());
        }

        Ok(ResultRecord::single(
            Match::Reference {
                text: self.references[index].clone(),
                score,
            },
            unit.page,
            unit.doc_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VraagError;

    fn references() -> Vec<String> {
        vec![
            "uittreksel handelsregister kamer van koophandel".to_string(),
            "verklaring omtrent het gedrag".to_string(),
        ]
    }

    #[test]
    fn test_match_above_threshold() {
        let matcher = SimilarityMatcher::new("q41", references(), 0.51).unwrap();
        let unit = TextUnit::whole("Uittreksel Handelsregister Kamer van Koophandel", "d1");

        let result = matcher.analyze(&unit).unwrap();
        assert!(result.matched());
        assert_eq!(result.page_numbers(), &[None]);
        match &result.matches()[0] {
            Match::Reference { text, score } => {
                assert_eq!(text, "uittreksel handelsregister kamer van koophandel");
                assert!(*score > 0.99);
            }
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_below_threshold_is_empty() {
        let matcher = SimilarityMatcher::new("q41", references(), 0.51).unwrap();
        let unit = TextUnit::whole("levering van kantoorartikelen", "d1");
        assert_eq!(matcher.analyze(&unit).unwrap(), ResultRecord::empty());
    }

    #[test]
    fn test_tie_goes_to_first_reference() {
        let matcher =
            SimilarityMatcher::new("t", vec!["zelfde tekst".into(), "zelfde tekst".into()], 0.0)
                .unwrap();
        let (index, _) = matcher.best_match(&TextUnit::whole("zelfde tekst", "d1")).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let err = SimilarityMatcher::new("q41", vec![], 0.5).unwrap_err();
        assert!(matches!(err, VraagError::Config(ConfigError::EmptyCorpus(_))));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let err = SimilarityMatcher::new("q41", references(), 1.5).unwrap_err();
        assert!(matches!(err, VraagError::Config(ConfigError::InvalidThreshold { .. })));
    }

    #[test]
    fn test_empty_text_fails_explicitly() {
        let matcher = SimilarityMatcher::new("q41", references(), 0.5).unwrap();
        let err = matcher.analyze(&TextUnit::whole("   ", "d1")).unwrap_err();
        assert!(matches!(err, VraagError::Execution(MatchExecutionError::EmptyText { .. })));
    }
}
