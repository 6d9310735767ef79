//! Documents, page spans and the per-document result context.

mod loader;

pub use loader::{load_document, load_page_spans, split_pages, DocumentLoader};

use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::models::result::ResultRecord;

/// Character range of one logical page within a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    /// Start offset (characters, inclusive).
    pub start: usize,
    /// End offset (characters, exclusive).
    pub end: usize,
}

impl PageSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Document text with its ordered page spans.
#[derive(Debug, Clone)]
pub struct Document {
    doc_id: String,
    contract_id: Option<String>,
    text: String,
    pages: Vec<PageSpan>,
    byte_ranges: Vec<Range<usize>>,
}

impl Document {
    /// Create a document without page spans.
    pub fn new(doc_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            contract_id: None,
            text: text.into(),
            pages: Vec::new(),
            byte_ranges: Vec::new(),
        }
    }

    /// Create a document by concatenating page texts; each page becomes one span.
    pub fn from_pages<S: AsRef<str>>(doc_id: impl Into<String>, pages: &[S]) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(pages.len());
        let mut byte_ranges = Vec::with_capacity(pages.len());
        let mut chars = 0;

        for page in pages {
            let page = page.as_ref();
            let byte_start = text.len();
            let char_count = page.chars().count();
            text.push_str(page);
            spans.push(PageSpan::new(chars, chars + char_count));
            byte_ranges.push(byte_start..text.len());
            chars += char_count;
        }

        Self {
            doc_id: doc_id.into(),
            contract_id: None,
            text,
            pages: spans,
            byte_ranges,
        }
    }

    /// Attach the contract this document belongs to.
    pub fn with_contract_id(mut self, contract_id: impl Into<String>) -> Self {
        self.contract_id = Some(contract_id.into());
        self
    }

    /// Attach page spans, replacing any existing ones.
    ///
    /// Spans must lie within the text, in order and without overlap.
    pub fn with_pages(mut self, pages: Vec<PageSpan>) -> Result<Self, DocumentError> {
        let len = self.text.chars().count();
        let mut previous_end = 0;

        for (index, span) in pages.iter().enumerate() {
            if span.start > span.end || span.end > len {
                return Err(DocumentError::InvalidSpan {
                    index,
                    start: span.start,
                    end: span.end,
                    len,
                });
            }
            if span.start < previous_end {
                return Err(DocumentError::UnorderedSpans {
                    index,
                    start: span.start,
                    previous_end,
                });
            }
            previous_end = span.end;
        }

        self.byte_ranges = char_to_byte_ranges(&self.text, &pages);
        self.pages = pages;
        Ok(self)
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn contract_id(&self) -> Option<&str> {
        self.contract_id.as_deref()
    }

    /// Full document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page_spans(&self) -> &[PageSpan] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of one page, if it exists.
    pub fn page_text(&self, index: usize) -> Option<&str> {
        self.byte_ranges.get(index).map(|r| &self.text[r.clone()])
    }

    /// Iterate over `(page index, page text)` in document order.
    pub fn pages(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.byte_ranges
            .iter()
            .enumerate()
            .map(|(i, r)| (i, &self.text[r.clone()]))
    }
}

/// Convert validated character spans to byte ranges in one pass over the text.
fn char_to_byte_ranges(text: &str, spans: &[PageSpan]) -> Vec<Range<usize>> {
    let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    boundaries.push(text.len());

    spans
        .iter()
        .map(|s| boundaries[s.start]..boundaries[s.end])
        .collect()
}

/// Per-document processing context: identifiers plus the question results.
///
/// Created fresh for each document and owned by whoever runs the pipeline
/// on it; each component writes only under its own question key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentContext {
    pub doc_id: String,
    pub contract_id: Option<String>,
    pub results: IndexMap<String, ResultRecord>,
}

impl DocumentContext {
    /// Fresh, empty context for a document.
    pub fn for_document(doc: &Document) -> Self {
        Self {
            doc_id: doc.doc_id().to_string(),
            contract_id: doc.contract_id().map(str::to_string),
            results: IndexMap::new(),
        }
    }

    /// Result stored for a question, if any.
    pub fn result(&self, question: &str) -> Option<&ResultRecord> {
        self.results.get(question)
    }
}
