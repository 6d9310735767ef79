//! Regex matcher: all patterns compiled once into a single alternation.

use regex::Regex;

use super::{Matcher, MatcherKind, TextUnit};
use crate::error::{ConfigError, Result};
use crate::models::result::{Match, ResultRecord};

/// Regex matcher.
///
/// A unit matches when the combined pattern occurs at least once. All
/// non-overlapping occurrences go into one aggregate [`Match::Findall`].
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Regex,
}

impl PatternMatcher {
    /// Compile `patterns` as `(?:p1)|(?:p2)|...`; inline flags stay scoped to
    /// their own pattern.
    pub fn new<S: AsRef<str>>(question: &str, patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Err(ConfigError::EmptyPatterns(question.to_string()).into());
        }

        let combined = patterns
            .iter()
            .map(|p| format!("(?:{})", p.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&combined).map_err(|source| ConfigError::InvalidPattern {
            question: question.to_string(),
            source,
        })?;

        Ok(Self { pattern })
    }

    /// All occurrences in `text`.
    ///
    /// Each item is the list of capture group values of one occurrence
    /// (empty string for groups that did not take part), or the whole
    /// occurrence when the pattern has no groups.
    pub fn findall(&self, text: &str) -> Vec<Vec<String>> {
        let groups = self.pattern.captures_len() - 1;

        self.pattern
            .captures_iter(text)
            .map(|caps| {
                if groups == 0 {
                    vec![caps[0].to_string()]
                } else {
                    (1..=groups)
                        .map(|i| caps.get(i).map_or_else(String::new, |m| m.as_str().to_string()))
                        .collect()
                }
            })
            .collect()
    }
}

impl Matcher for PatternMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Pattern
    }

    fn analyze(&self, unit: &TextUnit<'_>) -> Result<ResultRecord> {
        let found = self.findall(unit.text);

        if found.is_empty() {
            return Ok(ResultRecord::empty());
        }

        Ok(ResultRecord::single(
            Match::Findall(found),
            unit.page,
            unit.doc_id,
        ))
    }
}
