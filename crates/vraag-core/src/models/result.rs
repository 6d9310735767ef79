//! The homogeneous, mergeable outcome of a matcher.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

/// One matcher-specific match entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Match {
    /// All non-overlapping regex matches in one unit. Each item holds the
    /// capture groups of one match, or the whole match when the pattern has
    /// no groups.
    Findall(Vec<Vec<String>>),
    /// Token spans found by the structural matcher in one unit.
    Spans(Vec<TokenSpan>),
    /// Best-matching reference text of the similarity matcher.
    Reference { text: String, score: f64 },
    /// Leading snippet of a unit that passed the frequency threshold.
    Snippet(String),
}

/// A run of tokens matched by a token pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpan {
    /// First token index.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
    /// Covered text.
    pub text: String,
}

/// Outcome of one matcher over one or more units of text.
///
/// `matches`, `page_numbers` and `doc_ids` are positionally aligned: index
/// `i` of each refers to the same match. Records are immutable; [`merge`]
/// returns a new record.
///
/// [`merge`]: ResultRecord::merge
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawResultRecord")]
pub struct ResultRecord {
    matched: bool,
    matches: Vec<Match>,
    page_numbers: Vec<Option<usize>>,
    doc_ids: Vec<String>,
}

#[derive(Deserialize)]
struct RawResultRecord {
    matched: bool,
    #[serde(default)]
    matches: Vec<Match>,
    #[serde(default)]
    page_numbers: Vec<Option<usize>>,
    #[serde(default)]
    doc_ids: Vec<String>,
}

impl TryFrom<RawResultRecord> for ResultRecord {
    type Error = InvariantViolation;

    fn try_from(raw: RawResultRecord) -> Result<Self, Self::Error> {
        ResultRecord::new(raw.matched, raw.matches, raw.page_numbers, raw.doc_ids)
    }
}

impl ResultRecord {
    /// Build a record, checking alignment and the matched flag.
    pub fn new(
        matched: bool,
        matches: Vec<Match>,
        page_numbers: Vec<Option<usize>>,
        doc_ids: Vec<String>,
    ) -> Result<Self, InvariantViolation> {
        if matches.len() != page_numbers.len() || matches.len() != doc_ids.len() {
            return Err(InvariantViolation::LengthMismatch {
                matches: matches.len(),
                page_numbers: page_numbers.len(),
                doc_ids: doc_ids.len(),
            });
        }

        match (matched, matches.len()) {
            (false, 0) | (true, 1..) => {}
            (false, n) => return Err(InvariantViolation::UnmatchedWithEntries(n)),
            (true, 0) => return Err(InvariantViolation::MatchedWithoutEntries),
        }

        Ok(Self {
            matched,
            matches,
            page_numbers,
            doc_ids,
        })
    }

    /// The unmatched record; identity element of [`merge`](Self::merge).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A matched record with exactly one entry.
    pub fn single(entry: Match, page: Option<usize>, doc_id: impl Into<String>) -> Self {
        Self {
            matched: true,
            matches: vec![entry],
            page_numbers: vec![page],
            doc_ids: vec![doc_id.into()],
        }
    }

    /// Combine two records: `self`'s entries first, then `other`'s.
    ///
    /// Associative, with [`empty`](Self::empty) as identity. Entries are
    /// never reordered or deduplicated.
    pub fn merge(mut self, other: ResultRecord) -> ResultRecord {
        self.matched |= other.matched;
        self.matches.extend(other.matches);
        self.page_numbers.extend(other.page_numbers);
        self.doc_ids.extend(other.doc_ids);
        self
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn page_numbers(&self) -> &[Option<usize>] {
        &self.page_numbers
    }

    pub fn doc_ids(&self) -> &[String] {
        &self.doc_ids
    }

    /// Number of match entries.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl Add for ResultRecord {
    type Output = ResultRecord;

    fn add(self, other: ResultRecord) -> ResultRecord {
        self.merge(other)
    }
}

impl Sum for ResultRecord {
    fn sum<I: Iterator<Item = ResultRecord>>(iter: I) -> Self {
        iter.fold(ResultRecord::empty(), ResultRecord::merge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn snippet(text: &str) -> Match {
        Match::Snippet(text.to_string())
    }

    fn record(entries: &[(&str, Option<usize>, &str)]) -> ResultRecord {
        ResultRecord::new(
            !entries.is_empty(),
            entries.iter().map(|(m, _, _)| snippet(m)).collect(),
            entries.iter().map(|(_, p, _)| *p).collect(),
            entries.iter().map(|(_, _, d)| d.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_is_unmatched() {
        let empty = ResultRecord::empty();
        assert!(!empty.matched());
        assert!(empty.is_empty());
        assert!(empty.page_numbers().is_empty());
        assert!(empty.doc_ids().is_empty());
    }

    #[test]
    fn test_unmatched_with_entries_rejected() {
        let err = ResultRecord::new(
            false,
            vec![snippet("a")],
            vec![Some(0)],
            vec!["doc1".to_string()],
        )
        .unwrap_err();
        assert_eq!(err, InvariantViolation::UnmatchedWithEntries(1));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = ResultRecord::new(
            true,
            vec![snippet("a"), snippet("b")],
            vec![Some(1)],
            vec!["doc1".to_string(), "doc1".to_string()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::LengthMismatch {
                matches: 2,
                page_numbers: 1,
                doc_ids: 2,
            }
        );
    }

    #[test]
    fn test_matched_without_entries_rejected() {
        let err = ResultRecord::new(true, vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err, InvariantViolation::MatchedWithoutEntries);
    }

    #[test]
    fn test_identity() {
        let a = record(&[("test", Some(1), "101"), ("test2", Some(2), "102")]);
        assert_eq!(a.clone().merge(ResultRecord::empty()), a);
        assert_eq!(ResultRecord::empty().merge(a.clone()), a);
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let a = record(&[("test1", Some(1), "101"), ("test2", Some(2), "102")]);
        let b = record(&[("test3", Some(3), "104"), ("test4", Some(4), "105")]);

        let expected = record(&[
            ("test1", Some(1), "101"),
            ("test2", Some(2), "102"),
            ("test3", Some(3), "104"),
            ("test4", Some(4), "105"),
        ]);
        assert_eq!(a + b, expected);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = record(&[("a", Some(0), "d1")]);
        let b = ResultRecord::empty();
        let c = record(&[("c", None, "d2"), ("c2", Some(7), "d2")]);

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_merge_keeps_duplicates() {
        let a = record(&[("same", Some(0), "d1")]);
        let merged = a.clone() + a;
        assert_eq!(merged.len(), 2);
        assert!(merged.matched());
    }

    #[test]
    fn test_sum_of_nothing_is_identity() {
        let total: ResultRecord = Vec::<ResultRecord>::new().into_iter().sum();
        assert_eq!(total, ResultRecord::empty());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: ResultRecord = serde_json::from_str(
            r#"{"matched":true,"matches":[{"kind":"snippet","value":"abc"}],"page_numbers":[2],"doc_ids":["d"]}"#,
        )
        .unwrap();
        assert_eq!(ok, ResultRecord::single(snippet("abc"), Some(2), "d"));

        let bad = serde_json::from_str::<ResultRecord>(
            r#"{"matched":false,"matches":[{"kind":"snippet","value":"abc"}],"page_numbers":[2],"doc_ids":["d"]}"#,
        );
        assert!(bad.is_err());
    }

    fn arb_match() -> impl Strategy<Value = Match> {
        prop_oneof![
            "[a-z ]{0,12}".prop_map(Match::Snippet),
            ("[a-z]{1,8}", 0.0f64..=1.0).prop_map(|(text, score)| Match::Reference { text, score }),
            prop::collection::vec(prop::collection::vec("[a-z0-9]{0,6}", 1..3), 1..4)
                .prop_map(Match::Findall),
        ]
    }

    /// Valid records only: aligned vectors, matched iff there are entries.
    fn arb_record() -> impl Strategy<Value = ResultRecord> {
        prop::collection::vec(
            (arb_match(), prop::option::of(0usize..40), "d[0-9]{1,3}"),
            0..5,
        )
        .prop_map(|entries| {
            let matched = !entries.is_empty();
            let mut matches = Vec::new();
            let mut pages = Vec::new();
            let mut doc_ids = Vec::new();
            for (m, page, doc_id) in entries {
                matches.push(m);
                pages.push(page);
                doc_ids.push(doc_id);
            }
            ResultRecord::new(matched, matches, pages, doc_ids).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_empty_is_two_sided_identity(a in arb_record()) {
            prop_assert_eq!(a.clone().merge(ResultRecord::empty()), a.clone());
            prop_assert_eq!(ResultRecord::empty().merge(a.clone()), a);
        }

        #[test]
        fn prop_merge_is_associative(a in arb_record(), b in arb_record(), c in arb_record()) {
            let left = a.clone().merge(b.clone()).merge(c.clone());
            let right = a.merge(b.merge(c));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_merge_concatenates_in_order(a in arb_record(), b in arb_record()) {
            let merged = a.clone().merge(b.clone());

            prop_assert_eq!(merged.len(), a.len() + b.len());
            prop_assert_eq!(merged.matched(), a.matched() || b.matched());
            prop_assert_eq!(&merged.matches()[..a.len()], a.matches());
            prop_assert_eq!(&merged.matches()[a.len()..], b.matches());
            prop_assert_eq!(&merged.page_numbers()[..a.len()], a.page_numbers());
            prop_assert_eq!(&merged.page_numbers()[a.len()..], b.page_numbers());
            prop_assert_eq!(&merged.doc_ids()[..a.len()], a.doc_ids());
            prop_assert_eq!(&merged.doc_ids()[a.len()..], b.doc_ids());
        }

        #[test]
        fn prop_merged_record_stays_valid(a in arb_record(), b in arb_record()) {
            let merged = a.merge(b);
            let rebuilt = ResultRecord::new(
                merged.matched(),
                merged.matches().to_vec(),
                merged.page_numbers().to_vec(),
                merged.doc_ids().to_vec(),
            );
            prop_assert_eq!(rebuilt, Ok(merged));
        }
    }
}
