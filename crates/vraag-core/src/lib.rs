//! Core library for answering questions about Dutch contract documents.
//!
//! This crate provides:
//! - Matchers (regex, token patterns, TF-IDF similarity, keyword density)
//! - A mergeable result record shared by every matcher
//! - A pipeline folding per-page results into one answer per question
//! - The question catalogue and document loading helpers

pub mod document;
pub mod error;
pub mod matchers;
pub mod models;
pub mod pipeline;
pub mod registry;

pub use document::{Document, DocumentContext, DocumentLoader, PageSpan};
pub use error::{Result, VraagError};
pub use matchers::{Matcher, MatcherKind, TextUnit};
pub use models::config::VraagConfig;
pub use models::result::{Match, ResultRecord, TokenSpan};
pub use pipeline::{Pipeline, PipelineComponent};
pub use registry::{MatcherSpec, QuestionRegistry, QuestionSpec};
