//! Error types for the vraag-core library.

use thiserror::Error;

/// Main error type for the vraag library.
#[derive(Error, Debug)]
pub enum VraagError {
    /// Matcher or pipeline configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A result record was built with inconsistent contents.
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// A matcher failed while analyzing one unit of text.
    #[error("match failed: {0}")]
    Execution(#[from] MatchExecutionError),

    /// Unknown question identifier.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Document text or page spans are inconsistent.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid matcher configuration, detected when a matcher is built.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A regex pattern failed to compile.
    #[error("invalid pattern for {question}: {source}")]
    InvalidPattern {
        question: String,
        #[source]
        source: regex::Error,
    },

    /// No regex patterns were configured.
    #[error("no patterns configured for {0}")]
    EmptyPatterns(String),

    /// A token pattern list is empty, or one of its rules has no tokens.
    #[error("empty token pattern for {0}")]
    EmptyTokenPattern(String),

    /// The similarity matcher needs at least one reference text.
    #[error("empty reference corpus for {0}")]
    EmptyCorpus(String),

    /// The frequency matcher needs at least one target word.
    #[error("no target words configured for {0}")]
    EmptyTargetWords(String),

    /// Threshold outside the accepted range.
    #[error("invalid threshold for {question}: {value}")]
    InvalidThreshold { question: String, value: f64 },

    /// Malformed configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A result record whose parallel sequences disagree.
///
/// Signals a programming error in a matcher, never a data problem, so the
/// pipeline never swallows it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// `matches`, `page_numbers` and `doc_ids` must have equal lengths.
    #[error("sequence lengths differ: {matches} matches, {page_numbers} page numbers, {doc_ids} doc ids")]
    LengthMismatch {
        matches: usize,
        page_numbers: usize,
        doc_ids: usize,
    },

    /// An unmatched record must carry no entries.
    #[error("unmatched record carries {0} entries")]
    UnmatchedWithEntries(usize),

    /// A matched record must carry at least one entry.
    #[error("matched record carries no entries")]
    MatchedWithoutEntries,
}

/// Runtime failure while analyzing one unit of text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchExecutionError {
    /// The unit has no text to analyze.
    #[error("empty text in document {doc_id} (page {page:?})")]
    EmptyText { doc_id: String, page: Option<usize> },

    /// No terms survived tokenization of the corpus and unit.
    #[error("empty vocabulary in document {doc_id} (page {page:?})")]
    EmptyVocabulary { doc_id: String, page: Option<usize> },

    /// Any other failure.
    #[error("{0}")]
    Failed(String),
}

/// Registry lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No question registered under this identifier.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
}

/// Errors related to document text and page spans.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A page span ends before it starts or past the end of the text.
    #[error("page {index} span {start}..{end} is invalid for text of {len} characters")]
    InvalidSpan {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    /// Page spans must be in document order without overlap.
    #[error("page {index} starts at {start}, before the previous page ends at {previous_end}")]
    UnorderedSpans {
        index: usize,
        start: usize,
        previous_end: usize,
    },

    /// The document path does not yield contract and document identifiers.
    #[error("cannot derive identifiers from path: {0}")]
    InvalidPath(String),

    /// The page delimiter is not a valid regex.
    #[error("invalid page delimiter: {0}")]
    InvalidDelimiter(String),
}

/// Result type for the vraag library.
pub type Result<T> = std::result::Result<T, VraagError>;
