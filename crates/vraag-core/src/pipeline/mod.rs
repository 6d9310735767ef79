//! Question pipeline: runs matchers over documents and folds page results.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::document::{Document, DocumentContext};
use crate::error::{Result, VraagError};
use crate::matchers::{Matcher, MatcherKind, TextUnit};
use crate::models::result::ResultRecord;

/// Binds one question to a matcher and an iteration policy.
#[derive(Clone)]
pub struct PipelineComponent {
    question: String,
    matcher: Arc<dyn Matcher>,
    per_page: bool,
}

impl std::fmt::Debug for PipelineComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineComponent")
            .field("question", &self.question)
            .field("kind", &self.matcher.kind())
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl PipelineComponent {
    /// Create a component with the matcher kind's default iteration policy.
    pub fn new(question: impl Into<String>, matcher: impl Matcher + 'static) -> Self {
        let per_page = matcher.kind().per_page_by_default();
        Self {
            question: question.into(),
            matcher: Arc::new(matcher),
            per_page,
        }
    }

    /// Run once per page (`true`) or once over the whole document (`false`).
    pub fn with_per_page(mut self, per_page: bool) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn kind(&self) -> MatcherKind {
        self.matcher.kind()
    }

    pub fn per_page(&self) -> bool {
        self.per_page
    }

    /// Compute this question's result for a document.
    ///
    /// Per-page components fold page results in page order, starting from
    /// the empty record; a document without pages yields the empty record.
    pub fn evaluate(&self, doc: &Document) -> Result<ResultRecord> {
        if !self.per_page {
            return self.matcher.analyze(&TextUnit::whole(doc.text(), doc.doc_id()));
        }

        doc.pages()
            .try_fold(ResultRecord::empty(), |acc, (page, text)| -> Result<ResultRecord> {
                let unit = TextUnit::page(text, doc.doc_id(), page);
                Ok(acc.merge(self.matcher.analyze(&unit)?))
            })
    }

    /// Evaluate and store the result under this question in `ctx`.
    ///
    /// Execution errors are logged and leave `ctx` without this question;
    /// configuration and invariant errors propagate.
    pub fn process(&self, doc: &Document, ctx: &mut DocumentContext) -> Result<()> {
        match self.evaluate(doc) {
            Ok(record) => {
                debug!(
                    question = %self.question,
                    doc_id = doc.doc_id(),
                    matches = record.len(),
                    "question answered"
                );
                ctx.results.insert(self.question.clone(), record);
                Ok(())
            }
            Err(VraagError::Execution(e)) => {
                warn!(
                    "Error in {} ({}) for contract {}, document {}: {}",
                    self.question,
                    self.matcher.kind(),
                    doc.contract_id().unwrap_or("-"),
                    doc.doc_id(),
                    e
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Ordered list of question components.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    components: Vec<PipelineComponent>,
}

impl Pipeline {
    pub fn new(components: Vec<PipelineComponent>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[PipelineComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Answer every question for one document, in component order.
    pub fn run(&self, doc: &Document) -> Result<DocumentContext> {
        let start = Instant::now();
        let mut ctx = DocumentContext::for_document(doc);

        for component in &self.components {
            component.process(doc, &mut ctx)?;
        }

        debug!(
            doc_id = doc.doc_id(),
            answered = ctx.results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "document processed"
        );
        Ok(ctx)
    }

    /// Run documents one after another.
    pub fn run_all(&self, docs: &[Document]) -> Vec<Result<DocumentContext>> {
        docs.iter().map(|doc| self.run(doc)).collect()
    }

    /// Run documents in parallel. Output order follows input order.
    pub fn run_batch(&self, docs: &[Document]) -> Vec<Result<DocumentContext>> {
        info!(
            "Processing {} documents with {} questions",
            docs.len(),
            self.components.len()
        );
        docs.par_iter().map(|doc| self.run(doc)).collect()
    }
}
