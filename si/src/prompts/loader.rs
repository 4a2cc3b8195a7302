//! Prompt Loader
//!
//! Loads prompt text from an override directory or falls back to the
//! embedded defaults.

use std::path::PathBuf;

use eyre::{Result, eyre};
use tracing::debug;

use super::embedded;

/// Which system prompt a generator call uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Initial requirement analysis and first questions
    RequirementAnalyzer,
    /// Follow-up questions after an answer round
    QuestionGenerator,
    /// Gap classification
    GapAnalyzer,
    /// Final specification synthesis
    SpecCompiler,
}

impl PromptKind {
    /// Template name, also the override file stem
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::RequirementAnalyzer => "requirement-analyzer",
            Self::QuestionGenerator => "question-generator",
            Self::GapAnalyzer => "gap-analyzer",
            Self::SpecCompiler => "spec-compiler",
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.template_name())
    }
}

/// Loads prompt templates
#[derive(Debug, Clone, Default)]
pub struct PromptLoader {
    /// User override directory holding `<name>.pmt` files
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` before the embedded prompts
    pub fn new(dir: Option<PathBuf>) -> Self {
        debug!(?dir, "PromptLoader::new: called");
        Self {
            user_dir: dir.filter(|d| d.is_dir()),
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        Self { user_dir: None }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `<dir>/{name}.pmt`
    /// 2. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from user override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Load every system prompt the clarification workflow needs
    pub fn load_set(&self) -> Result<PromptSet> {
        debug!("load_set: called");
        Ok(PromptSet {
            requirement_analyzer: self.load_template(PromptKind::RequirementAnalyzer.template_name())?,
            question_generator: self.load_template(PromptKind::QuestionGenerator.template_name())?,
            gap_analyzer: self.load_template(PromptKind::GapAnalyzer.template_name())?,
            spec_compiler: self.load_template(PromptKind::SpecCompiler.template_name())?,
        })
    }

    /// Markdown template for compiled specifications
    pub fn spec_markdown_template(&self) -> Result<String> {
        self.load_template("spec-markdown")
    }
}

/// System prompts resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub requirement_analyzer: String,
    pub question_generator: String,
    pub gap_analyzer: String,
    pub spec_compiler: String,
}

impl PromptSet {
    /// The embedded prompts, with no overrides
    pub fn embedded() -> Self {
        Self {
            requirement_analyzer: embedded::REQUIREMENT_ANALYZER.to_string(),
            question_generator: embedded::QUESTION_GENERATOR.to_string(),
            gap_analyzer: embedded::GAP_ANALYZER.to_string(),
            spec_compiler: embedded::SPEC_COMPILER.to_string(),
        }
    }

    pub fn get(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::RequirementAnalyzer => &self.requirement_analyzer,
            PromptKind::QuestionGenerator => &self.question_generator,
            PromptKind::GapAnalyzer => &self.gap_analyzer,
            PromptKind::SpecCompiler => &self.spec_compiler,
        }
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_loader_embedded() {
        let loader = PromptLoader::embedded_only();
        let set = loader.load_set().unwrap();
        assert_eq!(set, PromptSet::embedded());
        assert!(set.get(PromptKind::SpecCompiler).contains("specification"));
    }

    #[test]
    fn test_prompt_loader_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }

    #[test]
    fn test_user_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gap-analyzer.pmt"), "custom gap prompt").unwrap();

        let loader = PromptLoader::new(Some(dir.path().to_path_buf()));
        let set = loader.load_set().unwrap();

        assert_eq!(set.gap_analyzer, "custom gap prompt");
        assert_eq!(set.spec_compiler, embedded::SPEC_COMPILER);
    }

    #[test]
    fn test_missing_override_dir_falls_back() {
        let loader = PromptLoader::new(Some(PathBuf::from("/definitely/not/here")));
        assert_eq!(loader.spec_markdown_template().unwrap(), embedded::SPEC_MARKDOWN);
    }
}
