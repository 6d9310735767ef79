//! Token-pattern matcher over lemma and lowercase constraints.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::tokenizer::{tokenize, Token};
use super::{Matcher, MatcherKind, TextUnit};
use crate::error::{ConfigError, Result};
use crate::models::result::{Match, ResultRecord, TokenSpan};

/// Constraint on a single token, written as `{"LEMMA": "betaal"}` etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenConstraint {
    /// Token lemma equals the value.
    #[serde(rename = "LEMMA")]
    Lemma(String),
    /// Lowercase token text equals the value.
    #[serde(rename = "LOWER")]
    Lower(String),
    /// Verbatim token text equals the value.
    #[serde(rename = "ORTH")]
    Orth(String),
}

impl TokenConstraint {
    fn accepts(&self, token: &Token<'_>) -> bool {
        match self {
            TokenConstraint::Lemma(v) => token.lemma == *v,
            TokenConstraint::Lower(v) => token.lower == *v,
            TokenConstraint::Orth(v) => token.text == v.as_str(),
        }
    }
}

/// A sequence of constraints matched against consecutive tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPattern(pub Vec<TokenConstraint>);

impl TokenPattern {
    fn matches_at(&self, tokens: &[Token<'_>], start: usize) -> bool {
        let rules = &self.0;
        start + rules.len() <= tokens.len()
            && rules
                .iter()
                .zip(&tokens[start..])
                .all(|(rule, token)| rule.accepts(token))
    }
}

/// Structural matcher.
///
/// A unit matches when any token pattern matches; all matching spans, in
/// document order, go into one aggregate [`Match::Spans`].
#[derive(Debug, Clone)]
pub struct StructuralMatcher {
    patterns: Vec<TokenPattern>,
    filter_overlaps: bool,
}

impl StructuralMatcher {
    /// Create a matcher from token patterns.
    pub fn new(question: &str, patterns: Vec<TokenPattern>) -> Result<Self> {
        if patterns.is_empty() || patterns.iter().any(|p| p.0.is_empty()) {
            return Err(ConfigError::EmptyTokenPattern(question.to_string()).into());
        }

        Ok(Self {
            patterns,
            filter_overlaps: false,
        })
    }

    /// Drop spans that overlap an earlier kept span.
    pub fn with_overlap_filter(mut self, filter: bool) -> Self {
        self.filter_overlaps = filter;
        self
    }

    /// All spans matched in `text`, sorted by start then end.
    pub fn find_spans(&self, text: &str) -> Vec<TokenSpan> {
        let tokens = tokenize(text);
        let mut spans = Vec::new();

        for start in 0..tokens.len() {
            for pattern in &self.patterns {
                if pattern.matches_at(&tokens, start) {
                    let end = start + pattern.0.len();
                    spans.push(TokenSpan {
                        start,
                        end,
                        text: text[tokens[start].start..tokens[end - 1].end].to_string(),
                    });
                }
            }
        }

        spans.sort_by_key(|s| (s.start, s.end));
        spans.dedup();

        if self.filter_overlaps {
            spans = filter_overlapping(spans);
        }
        spans
    }
}

/// Keep spans whose first and last tokens are not covered by a previously
/// kept span, then sort by start.
pub fn filter_overlapping(spans: Vec<TokenSpan>) -> Vec<TokenSpan> {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut kept = Vec::new();

    for span in spans {
        if !seen.contains(&span.start) && !seen.contains(&(span.end - 1)) {
            seen.extend(span.start..span.end);
            kept.push(span);
        }
    }

    kept.sort_by_key(|s| s.start);
    kept
}

impl Matcher for StructuralMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Structural
    }

    fn analyze(&self, unit: &TextUnit<'_>) -> Result<ResultRecord> {
        let spans = self.find_spans(unit.text);

        if spans.is_empty() {
            return Ok(ResultRecord::empty());
        }

        Ok(ResultRecord::single(Match::Spans(spans), unit.page, unit.doc_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn payment_patterns() -> Vec<TokenPattern> {
        serde_json::from_str(
            r#"[
                [{"LEMMA": "betaal"}, {"LEMMA": "termijn"}],
                [{"LOWER": "betaaltermijn"}],
                [{"LEMMA": "facturering"}]
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_constraints_deserialize() {
        let patterns = payment_patterns();
        assert_eq!(
            patterns[0],
            TokenPattern(vec![
                TokenConstraint::Lemma("betaal".to_string()),
                TokenConstraint::Lemma("termijn".to_string()),
            ])
        );
    }

    #[test]
    fn test_spans_in_document_order() {
        let matcher = StructuralMatcher::new("q27", payment_patterns()).unwrap();
        let spans = matcher.find_spans("De Betaaltermijn is 30 dagen. Betalen termijnen via facturering.");

        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Betaaltermijn", "Betalen termijnen", "facturering"]);
        assert_eq!((spans[1].start, spans[1].end), (6, 8));
    }

    #[test]
    fn test_analyze_single_entry() {
        let matcher = StructuralMatcher::new("q27", payment_patterns()).unwrap();
        let unit = TextUnit::page("facturering per maand, betaaltermijn 14 dagen", "d1", 3);

        let result = matcher.analyze(&unit).unwrap();
        assert!(result.matched());
        assert_eq!(result.len(), 1);
        assert_eq!(result.page_numbers(), &[Some(3)]);
        match &result.matches()[0] {
            Match::Spans(spans) => assert_eq!(spans.len(), 2),
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_no_match_is_empty() {
        let matcher = StructuralMatcher::new("q27", payment_patterns()).unwrap();
        let unit = TextUnit::whole("niets over geld", "d1");
        assert_eq!(matcher.analyze(&unit).unwrap(), ResultRecord::empty());
    }

    #[test]
    fn test_overlap_filter() {
        let patterns: Vec<TokenPattern> = serde_json::from_str(
            r#"[[{"LOWER": "algemene"}, {"LOWER": "voorwaarden"}], [{"LEMMA": "voorwaarde"}]]"#,
        )
        .unwrap();
        let text = "algemene voorwaarden";

        let all = StructuralMatcher::new("t", patterns.clone()).unwrap();
        assert_eq!(all.find_spans(text).len(), 2);

        let filtered = StructuralMatcher::new("t", patterns)
            .unwrap()
            .with_overlap_filter(true);
        let spans = filtered.find_spans(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "algemene voorwaarden");
    }

    #[test]
    fn test_orth_is_case_sensitive() {
        let patterns: Vec<TokenPattern> =
            serde_json::from_str(r#"[[{"ORTH": "BIVC"}, {"LOWER": "code"}]]"#).unwrap();
        assert_eq!(
            patterns[0].0[0],
            TokenConstraint::Orth("BIVC".to_string())
        );

        let matcher = StructuralMatcher::new("q51", patterns).unwrap();
        let spans = matcher.find_spans("de bivc code, de BIVC Code");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "BIVC Code");
        assert_eq!((spans[0].start, spans[0].end), (5, 7));
    }

    #[test]
    fn test_empty_rule_rejected() {
        assert!(StructuralMatcher::new("t", vec![TokenPattern(vec![])]).is_err());
        assert!(StructuralMatcher::new("t", vec![]).is_err());
    }
}
