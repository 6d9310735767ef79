//! Matchers turning one unit of text into one [`ResultRecord`].

pub mod frequency;
pub mod pattern;
pub mod similarity;
pub mod structural;
pub mod tfidf;
pub mod tokenizer;

pub use frequency::FrequencyMatcher;
pub use pattern::PatternMatcher;
pub use similarity::SimilarityMatcher;
pub use structural::{StructuralMatcher, TokenConstraint, TokenPattern};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::models::result::ResultRecord;

/// One unit of text handed to a matcher, with the context needed to label
/// its matches.
#[derive(Debug, Clone, Copy)]
pub struct TextUnit<'a> {
    /// Text to analyze.
    pub text: &'a str,
    /// Identifier of the owning document.
    pub doc_id: &'a str,
    /// Page index, or `None` when the unit is the whole document.
    pub page: Option<usize>,
}

impl<'a> TextUnit<'a> {
    pub fn page(text: &'a str, doc_id: &'a str, page: usize) -> Self {
        Self {
            text,
            doc_id,
            page: Some(page),
        }
    }

    pub fn whole(text: &'a str, doc_id: &'a str) -> Self {
        Self {
            text,
            doc_id,
            page: None,
        }
    }
}

/// Kind of matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    Pattern,
    Structural,
    Similarity,
    Frequency,
}

impl MatcherKind {
    /// Whether matchers of this kind run once per page by default.
    pub fn per_page_by_default(&self) -> bool {
        !matches!(self, MatcherKind::Similarity)
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatcherKind::Pattern => "pattern",
            MatcherKind::Structural => "structural",
            MatcherKind::Similarity => "similarity",
            MatcherKind::Frequency => "frequency",
        };
        f.write_str(name)
    }
}

/// Trait for matching strategies.
///
/// Implementations hold only state compiled at construction and never
/// mutate it while analyzing, so one matcher can serve many documents at
/// once.
pub trait Matcher: Send + Sync {
    /// The strategy this matcher implements.
    fn kind(&self) -> MatcherKind;

    /// Analyze one unit of text.
    ///
    /// "No match" is an unmatched record, not an error. Errors are
    /// reserved for units that cannot be analyzed at all.
    fn analyze(&self, unit: &TextUnit<'_>) -> Result<ResultRecord>;
}

/// Check a `[0, 1]` threshold.
pub(crate) fn unit_threshold(question: &str, value: f64) -> std::result::Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidThreshold {
            question: question.to_string(),
            value,
        })
    }
}
