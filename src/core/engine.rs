/// The prompt engine facade: library loading, configuration, and generation.
///
/// Wraps a [`TemplateLibrary`] and an RNG so callers can ask for prompts by
/// keyword without threading randomness or limits through every call.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::expander::{Expander, ExpansionLimits};
use crate::core::library::{LibraryError, TemplateLibrary};
use crate::core::lint::{lint, LintReport};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("library error: {0}")]
    Library(#[from] LibraryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Engine settings, loadable from RON. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed RNG seed. Unset means OS entropy.
    pub seed: Option<u64>,
    /// Library files loaded in order; later files override earlier keywords.
    pub libraries: Vec<String>,
    pub limits: ExpansionLimits,
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, EngineError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }
}

/// The top-level prompt engine. Built via `PromptEngine::builder()`.
pub struct PromptEngine {
    library: TemplateLibrary,
    limits: ExpansionLimits,
    rng: StdRng,
}

/// Builder for constructing a `PromptEngine`.
#[derive(Default)]
pub struct PromptEngineBuilder {
    config: Option<EngineConfig>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    limits: Option<ExpansionLimits>,
    library_paths: Vec<PathBuf>,
    /// Directly provided library (for testing without files).
    library: Option<TemplateLibrary>,
}

impl PromptEngine {
    pub fn builder() -> PromptEngineBuilder {
        PromptEngineBuilder::default()
    }

    /// Generate one prompt for `keyword`. Unknown keywords come back upper-cased.
    pub fn generate(&mut self, keyword: &str) -> String {
        self.generate_many(keyword, 1, false)
    }

    /// Generate `amount` prompts for `keyword`, joined as "a, b and c".
    pub fn generate_many(&mut self, keyword: &str, amount: usize, allow_repeat: bool) -> String {
        Expander::with_limits(&self.library, self.limits).generate_with(
            keyword,
            amount,
            allow_repeat,
            &mut self.rng,
        )
    }

    /// Generate `count` independent prompts for `keyword`.
    pub fn generate_variants(&mut self, keyword: &str, count: usize) -> Vec<String> {
        (0..count).map(|_| self.generate(keyword)).collect()
    }

    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.library.contains(keyword)
    }

    /// All valid keywords, sorted.
    pub fn keywords(&self) -> Vec<&str> {
        self.library.keywords()
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn limits(&self) -> &ExpansionLimits {
        &self.limits
    }

    pub fn lint(&self) -> LintReport {
        lint(&self.library)
    }

    /// Reseed the engine's RNG.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl PromptEngineBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn limits(mut self, limits: ExpansionLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Read an `EngineConfig` from a RON file at build time. Takes the place
    /// of `config()`; `seed()` and `limits()` still override it.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load a library file after the configured ones.
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_paths.push(path.into());
        self
    }

    /// Provide a library directly (for testing without files).
    pub fn with_library(mut self, library: TemplateLibrary) -> Self {
        self.library = Some(library);
        self
    }

    pub fn build(self) -> Result<PromptEngine, EngineError> {
        let config = match self.config_path {
            Some(ref path) => EngineConfig::load_from_ron(path)?,
            None => self.config.unwrap_or_default(),
        };
        let seed = self.seed.or(config.seed);
        let limits = self.limits.unwrap_or(config.limits);

        // Directly provided entries form the base; files override them
        let mut library = self.library.unwrap_or_default();
        let paths = config
            .libraries
            .iter()
            .map(PathBuf::from)
            .chain(self.library_paths);
        for path in paths {
            let loaded = TemplateLibrary::load(&path)?;
            tracing::info!(path = %path.display(), keywords = loaded.len(), "loaded template library");
            library.merge(loaded);
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(PromptEngine {
            library,
            limits,
            rng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selector::Pool;

    fn test_library() -> TemplateLibrary {
        TemplateLibrary::parse_ron(
            r#"{
                "murder": ["The ?{victim} was found dead in the ?{place}."],
                "victim": ["baker", "judge", "clown"],
                "place": ["library", "courtroom"],
                "asspull": ["the butler had a twin", "it was all a dream", "the parrot saw it"],
            }"#,
        )
        .unwrap()
    }

    fn build_test_engine(seed: u64) -> PromptEngine {
        PromptEngine::builder()
            .seed(seed)
            .with_library(test_library())
            .build()
            .unwrap()
    }

    #[test]
    fn generate_expands_wildcards() {
        let mut engine = build_test_engine(42);
        let out = engine.generate("murder");
        assert!(out.starts_with("The "), "got: {}", out);
        assert!(!out.contains("?{"), "unexpanded wildcard in: {}", out);
        assert!(out.ends_with('.'));
    }

    #[test]
    fn generate_deterministic_same_seed() {
        let mut a = build_test_engine(7);
        let mut b = build_test_engine(7);
        for _ in 0..5 {
            assert_eq!(a.generate("murder"), b.generate("murder"));
        }
    }

    #[test]
    fn generate_different_with_different_seed() {
        let first = build_test_engine(1).generate_variants("murder", 5);
        let found_different = (2..50).any(|seed| build_test_engine(seed).generate_variants("murder", 5) != first);
        assert!(found_different, "Expected different output with different seeds");
    }

    #[test]
    fn generate_many_joins_items() {
        let mut engine = build_test_engine(3);
        let out = engine.generate_many("asspull", 3, true);
        assert_eq!(out.matches(" and ").count(), 1, "got: {}", out);
        assert_eq!(out.matches(", ").count(), 1, "got: {}", out);
    }

    #[test]
    fn generate_unknown_keyword() {
        let mut engine = build_test_engine(3);
        assert!(!engine.contains_keyword("ghost"));
        assert_eq!(engine.generate("ghost"), "GHOST");
    }

    #[test]
    fn generate_variants_count() {
        let mut engine = build_test_engine(5);
        let variants = engine.generate_variants("victim", 4);
        assert_eq!(variants.len(), 4);
        assert!(variants.iter().all(|v| ["baker", "judge", "clown"].contains(&v.as_str())));
    }

    #[test]
    fn reseed_restarts_sequence() {
        let mut engine = build_test_engine(11);
        let first = engine.generate_variants("murder", 3);
        engine.reseed(11);
        assert_eq!(engine.generate_variants("murder", 3), first);
    }

    #[test]
    fn builder_limits_override_config() {
        let config = EngineConfig {
            seed: Some(9),
            libraries: Vec::new(),
            limits: ExpansionLimits {
                max_amount: 3,
                ..ExpansionLimits::default()
            },
        };
        let engine = PromptEngine::builder()
            .config(config)
            .limits(ExpansionLimits {
                max_depth: 2,
                ..ExpansionLimits::default()
            })
            .build()
            .unwrap();
        assert_eq!(engine.limits().max_depth, 2);
        assert_eq!(engine.limits().max_amount, 10);
    }

    #[test]
    fn config_from_ron_defaults_missing_fields() {
        let config: EngineConfig = ron::from_str("(seed: Some(4), limits: (max_amount: 5))").unwrap();
        assert_eq!(config.seed, Some(4));
        assert!(config.libraries.is_empty());
        assert_eq!(config.limits.max_amount, 5);
        assert_eq!(config.limits.max_depth, 5);
    }

    #[test]
    fn keywords_and_lint() {
        let mut library = test_library();
        library.insert("broken", Pool::from("?{nowhere}"));
        let engine = PromptEngine::builder().seed(1).with_library(library).build().unwrap();
        assert_eq!(
            engine.keywords(),
            vec!["asspull", "broken", "murder", "place", "victim"]
        );
        assert!(!engine.lint().is_clean());
    }

    #[test]
    fn missing_library_file_is_error() {
        let result = PromptEngine::builder()
            .library_path("does/not/exist.ron")
            .build();
        assert!(matches!(result, Err(EngineError::Library(LibraryError::Io(_)))));
    }
}
