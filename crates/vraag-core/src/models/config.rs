//! Configuration structures for the question pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::registry::QuestionRegistry;

/// Main configuration for the vraag pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VraagConfig {
    /// Document loading configuration.
    pub documents: DocumentConfig,

    /// Question pipeline configuration.
    pub pipeline: PipelineConfig,
}

/// Document loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Directory holding `<contract_id>/<doc_id>.json` page span files.
    pub spans_dir: Option<PathBuf>,

    /// Regex used to split raw text into pages when no span file exists.
    pub page_delimiter: String,

    /// Extension of extracted text files.
    pub extension: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            spans_dir: None,
            page_delimiter: r"[\t\n]{4,5}".to_string(),
            extension: "txt".to_string(),
        }
    }
}

/// Question pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Questions to answer, in order. Empty means every registered question.
    pub questions: Vec<String>,

    /// JSON question catalogue replacing the built-in one.
    pub questions_file: Option<PathBuf>,

    /// Process documents in parallel.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            questions: Vec::new(),
            questions_file: None,
            parallel: true,
        }
    }
}

impl VraagConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The question catalogue this configuration selects.
    pub fn registry(&self) -> Result<QuestionRegistry> {
        match &self.pipeline.questions_file {
            Some(path) => QuestionRegistry::from_file(path),
            None => QuestionRegistry::builtin(),
        }
    }
}
