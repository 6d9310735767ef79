//! Question registry: question identifiers mapped to matcher configurations.

mod catalogue;

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, LookupError, Result};
use crate::matchers::{
    FrequencyMatcher, MatcherKind, PatternMatcher, SimilarityMatcher, StructuralMatcher,
    TokenPattern,
};
use crate::pipeline::{Pipeline, PipelineComponent};

/// Matcher configuration of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherSpec {
    /// Regex patterns, combined into one alternation.
    Pattern { patterns: Vec<String> },
    /// Token patterns.
    Structural {
        patterns: Vec<TokenPattern>,
        #[serde(default)]
        filter_overlaps: bool,
    },
    /// Reference corpus and similarity threshold in `[0, 1]`.
    Similarity {
        references: Vec<String>,
        threshold: f64,
    },
    /// Target words and density threshold.
    Frequency { words: Vec<String>, threshold: f64 },
}

impl MatcherSpec {
    pub fn kind(&self) -> MatcherKind {
        match self {
            MatcherSpec::Pattern { .. } => MatcherKind::Pattern,
            MatcherSpec::Structural { .. } => MatcherKind::Structural,
            MatcherSpec::Similarity { .. } => MatcherKind::Similarity,
            MatcherSpec::Frequency { .. } => MatcherKind::Frequency,
        }
    }
}

/// One registered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// Question identifier, also the key of its result.
    pub id: String,
    /// What the question asks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Matcher configuration.
    pub matcher: MatcherSpec,
    /// Overrides the matcher kind's default iteration policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<bool>,
}

impl QuestionSpec {
    pub fn new(id: impl Into<String>, matcher: MatcherSpec) -> Self {
        Self {
            id: id.into(),
            description: None,
            matcher,
            per_page: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the question runs once per page.
    pub fn per_page(&self) -> bool {
        self.per_page
            .unwrap_or_else(|| self.matcher.kind().per_page_by_default())
    }

    /// Compile the matcher and wrap it in a pipeline component.
    pub fn build(&self) -> Result<PipelineComponent> {
        let id = self.id.as_str();
        let component = match &self.matcher {
            MatcherSpec::Pattern { patterns } => {
                PipelineComponent::new(id, PatternMatcher::new(id, patterns)?)
            }
            MatcherSpec::Structural {
                patterns,
                filter_overlaps,
            } => PipelineComponent::new(
                id,
                StructuralMatcher::new(id, patterns.clone())?.with_overlap_filter(*filter_overlaps),
            ),
            MatcherSpec::Similarity {
                references,
                threshold,
            } => PipelineComponent::new(
                id,
                SimilarityMatcher::new(id, references.clone(), *threshold)?,
            ),
            MatcherSpec::Frequency { words, threshold } => {
                PipelineComponent::new(id, FrequencyMatcher::new(id, words.clone(), *threshold)?)
            }
        };

        Ok(component.with_per_page(self.per_page()))
    }
}

/// On-disk catalogue format.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogueFile {
    questions: Vec<QuestionSpec>,
}

/// Static catalogue of questions, in registration order.
#[derive(Debug, Clone)]
pub struct QuestionRegistry {
    questions: IndexMap<String, QuestionSpec>,
}

impl QuestionRegistry {
    /// The built-in catalogue.
    pub fn builtin() -> Result<Self> {
        Self::from_specs(catalogue::builtin_questions())
    }

    /// Build a registry; identifiers must be unique.
    pub fn from_specs(specs: Vec<QuestionSpec>) -> Result<Self> {
        let mut questions = IndexMap::with_capacity(specs.len());
        for spec in specs {
            if questions.contains_key(&spec.id) {
                return Err(ConfigError::Invalid(format!("duplicate question id: {}", spec.id)).into());
            }
            questions.insert(spec.id.clone(), spec);
        }
        Ok(Self { questions })
    }

    /// Load a catalogue from a JSON file of the form `{"questions": [...]}`.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading question catalogue from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let file: CatalogueFile = serde_json::from_str(&content)?;
        Self::from_specs(file.questions)
    }

    /// Serialize the catalogue in the format [`from_file`](Self::from_file) reads.
    pub fn to_json(&self) -> Result<String> {
        let file = CatalogueFile {
            questions: self.questions.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Look up a question.
    pub fn get(&self, id: &str) -> Result<&QuestionSpec> {
        self.questions
            .get(id)
            .ok_or_else(|| LookupError::UnknownQuestion(id.to_string()).into())
    }

    /// Question identifiers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.questions.keys().map(String::as_str)
    }

    pub fn specs(&self) -> impl Iterator<Item = &QuestionSpec> + '_ {
        self.questions.values()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Build the component for one question.
    pub fn component(&self, id: &str) -> Result<PipelineComponent> {
        self.get(id)?.build()
    }

    /// Build a pipeline for the given questions, in the given order.
    /// An empty selection means every registered question.
    pub fn pipeline<S: AsRef<str>>(&self, ids: &[S]) -> Result<Pipeline> {
        let components = if ids.is_empty() {
            self.specs().map(QuestionSpec::build).collect::<Result<Vec<_>>>()?
        } else {
            ids.iter()
                .map(|id| self.component(id.as_ref()))
                .collect::<Result<Vec<_>>>()?
        };
        Ok(Pipeline::new(components))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::error::VraagError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_order() {
        let registry = QuestionRegistry::builtin().unwrap();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(
            ids,
            vec!["q8", "q13", "q17", "q20", "q23", "q27", "q28", "q31", "q41", "q42", "q51"]
        );
    }

    #[test]
    fn test_every_builtin_question_builds() {
        let pipeline = QuestionRegistry::builtin().unwrap().pipeline::<&str>(&[]).unwrap();
        assert_eq!(pipeline.len(), 11);
        assert!(!pipeline.components()[8].per_page());
    }

    #[test]
    fn test_unknown_question_is_lookup_error() {
        let registry = QuestionRegistry::builtin().unwrap();
        let err = registry.get("q999").unwrap_err();
        assert!(matches!(
            err,
            VraagError::Lookup(LookupError::UnknownQuestion(ref id)) if id == "q999"
        ));
        assert!(registry.pipeline(&["q8", "q999"]).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let spec = QuestionSpec::new(
            "x",
            MatcherSpec::Pattern {
                patterns: vec!["a".into()],
            },
        );
        assert!(QuestionRegistry::from_specs(vec![spec.clone(), spec]).is_err());
    }

    #[test]
    fn test_selected_pipeline_answers_questions() {
        let pipeline = QuestionRegistry::builtin().unwrap().pipeline(&["q8", "q42"]).unwrap();
        let doc = Document::from_pages(
            "d1",
            &["voorblad", "tussen partij A en dossiernummer 123 risico risk"],
        );

        let ctx = pipeline.run(&doc).unwrap();
        let keys: Vec<&String> = ctx.results.keys().collect();
        assert_eq!(keys, vec!["q8", "q42"]);
        assert_eq!(ctx.result("q8").unwrap().page_numbers(), &[Some(1)]);
        assert!(ctx.result("q42").unwrap().matched());
    }

    #[test]
    fn test_catalogue_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("questions.json");

        let registry = QuestionRegistry::builtin().unwrap();
        std::fs::write(&path, registry.to_json().unwrap()).unwrap();

        let loaded = QuestionRegistry::from_file(&path).unwrap();
        assert_eq!(loaded.len(), registry.len());
        assert_eq!(loaded.get("q27").unwrap(), registry.get("q27").unwrap());
    }

    #[test]
    fn test_catalogue_file_with_bad_regex_fails_on_build() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(
            &path,
            r#"{"questions": [{"id": "x", "matcher": {"kind": "pattern", "patterns": ["(open"]}}]}"#,
        )
        .unwrap();

        let registry = QuestionRegistry::from_file(&path).unwrap();
        let err = registry.component("x").unwrap_err();
        assert!(matches!(err, VraagError::Config(ConfigError::InvalidPattern { .. })));
    }
}
