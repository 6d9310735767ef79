//! Normalized-frequency matcher: keyword density above a threshold.

use std::collections::HashMap;

use super::{Matcher, MatcherKind, TextUnit};
use crate::error::{ConfigError, MatchExecutionError, Result};
use crate::models::result::{Match, ResultRecord};

/// Characters of unit text kept as the match snippet.
pub const SNIPPET_CHARS: usize = 100;

/// Frequency matcher.
///
/// Counts whitespace-separated occurrences of the target words and divides
/// by the character length of the unit text (not the token count).
#[derive(Debug, Clone)]
pub struct FrequencyMatcher {
    words: Vec<String>,
    threshold: f64,
}

impl FrequencyMatcher {
    pub fn new(question: &str, words: Vec<String>, threshold: f64) -> Result<Self> {
        if words.is_empty() {
            return Err(ConfigError::EmptyTargetWords(question.to_string()).into());
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                question: question.to_string(),
                value: threshold,
            }
            .into());
        }

        Ok(Self { words, threshold })
    }

    /// Target-word occurrences per character of `text`.
    pub fn normalized_count(&self, unit: &TextUnit<'_>) -> Result<f64> {
        let length = unit.text.chars().count();
        if length == 0 {
            return Err(MatchExecutionError::EmptyText {
                doc_id: unit.doc_id.to_string(),
                page: unit.page,
            }
            .into());
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in unit.text.split_whitespace() {
            *counts.entry(token).or_insert(0) += 1;
        }
        let hits: usize = self
            .words
            .iter()
            .map(|w| counts.get(w.as_str()).copied().unwrap_or(0))
            .sum();

        Ok(hits as f64 / length as f64)
    }
}

impl Matcher for FrequencyMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Frequency
    }

    fn analyze(&self, unit: &TextUnit<'_>) -> Result<ResultRecord> {
        if self.normalized_count(unit)? <= self.threshold {
            return Ok(ResultRecord::empty());
        }

        let snippet: String = unit.text.chars().take(SNIPPET_CHARS).collect();
        Ok(ResultRecord::single(Match::Snippet(snippet), unit.page, unit.doc_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VraagError;
    use pretty_assertions::assert_eq;

    fn risk_matcher() -> FrequencyMatcher {
        FrequencyMatcher::new("q42", vec!["risk".into(), "risico".into()], 0.001).unwrap()
    }

    #[test]
    fn test_ratio_uses_character_length() {
        let unit = TextUnit::page("risk risk risico", "d1", 0);
        let ratio = risk_matcher().normalized_count(&unit).unwrap();
        assert!((ratio - 3.0 / 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_match_keeps_leading_snippet() {
        let text = format!("risico {}", "x".repeat(200));
        let unit = TextUnit::page(&text, "d1", 4);

        let result = risk_matcher().analyze(&unit).unwrap();
        assert!(result.matched());
        assert_eq!(result.page_numbers(), &[Some(4)]);
        match &result.matches()[0] {
            Match::Snippet(s) => assert_eq!(s.chars().count(), SNIPPET_CHARS),
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_words_must_match_whole_tokens() {
        let unit = TextUnit::page("risicovol risks", "d1", 0);
        assert_eq!(risk_matcher().analyze(&unit).unwrap(), ResultRecord::empty());
    }

    #[test]
    fn test_empty_text_is_execution_error() {
        let err = risk_matcher().analyze(&TextUnit::page("", "d1", 0)).unwrap_err();
        assert!(matches!(err, VraagError::Execution(_)));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(FrequencyMatcher::new("q42", vec!["risk".into()], -0.1).is_err());
    }
}
