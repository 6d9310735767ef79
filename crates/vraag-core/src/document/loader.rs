//! Loading documents from extracted text files.
//!
//! Text files live at `<root>/<contract_id>/<doc_id>.<ext>`. Page spans, when
//! available, live at `<spans_dir>/<contract_id>/<doc_id>.json` as a JSON
//! array of `{"start": .., "end": ..}` character offsets.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use super::{Document, PageSpan};
use crate::error::{DocumentError, Result};
use crate::models::config::DocumentConfig;

/// Builds [`Document`]s from text files on disk.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    spans_dir: Option<PathBuf>,
    page_delimiter: Regex,
}

impl DocumentLoader {
    /// Create a loader from the document configuration.
    pub fn new(config: &DocumentConfig) -> Result<Self> {
        let page_delimiter = Regex::new(&config.page_delimiter)
            .map_err(|e| DocumentError::InvalidDelimiter(e.to_string()))?;

        Ok(Self {
            spans_dir: config.spans_dir.clone(),
            page_delimiter,
        })
    }

    /// Load one document.
    ///
    /// Uses the stored page spans when a spans file exists, otherwise splits
    /// the raw text on the page delimiter.
    pub fn load(&self, path: &Path) -> Result<Document> {
        let (contract_id, doc_id) = ids_from_path(path)?;
        let text = fs::read_to_string(path)?;

        let spans_path = self
            .spans_dir
            .as_ref()
            .map(|dir| dir.join(&contract_id).join(format!("{doc_id}.json")));

        let document = match spans_path {
            Some(spans_path) if spans_path.exists() => {
                debug!("Loading page spans from {}", spans_path.display());
                let spans = load_page_spans(&spans_path)?;
                Document::new(doc_id, text).with_pages(spans)?
            }
            Some(spans_path) => {
                warn!(
                    "No page spans at {}, splitting on delimiter",
                    spans_path.display()
                );
                Document::from_pages(doc_id, &split_pages(&text, &self.page_delimiter))
            }
            None => Document::from_pages(doc_id, &split_pages(&text, &self.page_delimiter)),
        };

        Ok(document.with_contract_id(contract_id))
    }
}

/// Load a document with an explicit spans directory and the default delimiter.
pub fn load_document(path: &Path, spans_dir: Option<&Path>) -> Result<Document> {
    let config = DocumentConfig {
        spans_dir: spans_dir.map(Path::to_path_buf),
        ..DocumentConfig::default()
    };
    DocumentLoader::new(&config)?.load(path)
}

/// Read page spans from a JSON file.
pub fn load_page_spans(path: &Path) -> Result<Vec<PageSpan>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Split raw text into pages on a delimiter, dropping empty pieces.
pub fn split_pages<'a>(text: &'a str, delimiter: &Regex) -> Vec<&'a str> {
    delimiter.split(text).filter(|p| !p.is_empty()).collect()
}

/// `(contract_id, doc_id)` from the parent directory name and file stem.
fn ids_from_path(path: &Path) -> Result<(String, String)> {
    let doc_id = path.file_stem().and_then(|s| s.to_str());
    let contract_id = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|s| s.to_str());

    match (contract_id, doc_id) {
        (Some(c), Some(d)) => Ok((c.to_string(), d.to_string())),
        _ => Err(DocumentError::InvalidPath(path.display().to_string()).into()),
    }
}
