/// Template library — keyword → template pool mapping, loading, and merging.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::selector::Pool;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("YAML deserialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported library format: {0}")]
    UnsupportedFormat(String),
}

/// Read-only mapping from keyword to the templates it can produce.
///
/// Keywords are case-sensitive. Loaded once and shared immutably by every
/// generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateLibrary {
    entries: HashMap<String, Pool>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<TemplateLibrary, LibraryError> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("ron") => Self::load_from_ron(path),
            Some("yaml") | Some("yml") => Self::load_from_yaml(path),
            _ => Err(LibraryError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load a library from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<TemplateLibrary, LibraryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a RON map of `"keyword": ["template", ...]` or `"keyword": "template"`.
    pub fn parse_ron(input: &str) -> Result<TemplateLibrary, LibraryError> {
        let entries: HashMap<String, Pool> = ron::from_str(input)?;
        Ok(TemplateLibrary { entries })
    }

    /// Load a library from a YAML file.
    pub fn load_from_yaml(path: &Path) -> Result<TemplateLibrary, LibraryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_yaml(&contents)
    }

    /// Parse a YAML mapping of `keyword: [template, ...]` or `keyword: template`.
    pub fn parse_yaml(input: &str) -> Result<TemplateLibrary, LibraryError> {
        let entries: HashMap<String, Pool> = serde_yaml::from_str(input)?;
        Ok(TemplateLibrary { entries })
    }

    /// Merge another library into this one. Entries from `other` override
    /// entries in `self` with the same keyword.
    pub fn merge(&mut self, other: TemplateLibrary) {
        self.entries.extend(other.entries);
    }

    pub fn insert(&mut self, keyword: impl Into<String>, pool: Pool) {
        self.entries.insert(keyword.into(), pool);
    }

    pub fn get(&self, keyword: &str) -> Option<&Pool> {
        self.entries.get(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.contains_key(keyword)
    }

    /// All keywords, sorted.
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Pool)> for TemplateLibrary {
    fn from_iter<I: IntoIterator<Item = (String, Pool)>>(iter: I) -> Self {
        TemplateLibrary {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ron_lists_and_scalars() {
        let lib = TemplateLibrary::parse_ron(
            r#"{
                "color": ["red", "green", "blue"],
                "motto": "Objection!",
            }"#,
        )
        .unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("color"), Some(&Pool::from(vec!["red", "green", "blue"])));
        assert_eq!(lib.get("motto"), Some(&Pool::Scalar("Objection!".to_string())));
    }

    #[test]
    fn parse_yaml_lists_and_scalars() {
        let lib = TemplateLibrary::parse_yaml(
            "color:\n  - red\n  - green\nmotto: Hold it!\n",
        )
        .unwrap();
        assert_eq!(lib.get("color"), Some(&Pool::from(vec!["red", "green"])));
        assert_eq!(lib.get("motto"), Some(&Pool::Scalar("Hold it!".to_string())));
    }

    #[test]
    fn parse_yaml_numeric_entries_become_text() {
        let lib = TemplateLibrary::parse_yaml("year:\n  - 1999\n  - 2004\nready: true\n").unwrap();
        assert_eq!(lib.get("year"), Some(&Pool::from(vec!["1999", "2004"])));
        assert_eq!(lib.get("ready"), Some(&Pool::from("true")));
    }

    #[test]
    fn parse_ron_error() {
        assert!(matches!(
            TemplateLibrary::parse_ron("{ not ron"),
            Err(LibraryError::Ron(_))
        ));
    }

    #[test]
    fn unsupported_extension() {
        let err = TemplateLibrary::load(Path::new("prompts.txt")).unwrap_err();
        assert!(matches!(err, LibraryError::UnsupportedFormat(_)));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let mut lib = TemplateLibrary::new();
        lib.insert("Weapon", Pool::from("knife"));
        assert!(lib.contains("Weapon"));
        assert!(!lib.contains("weapon"));
    }

    #[test]
    fn keywords_sorted() {
        let mut lib = TemplateLibrary::new();
        lib.insert("murder", Pool::from("a"));
        lib.insert("asspull", Pool::from("b"));
        lib.insert("location", Pool::from("c"));
        assert_eq!(lib.keywords(), vec!["asspull", "location", "murder"]);
    }

    #[test]
    fn merge_precedence() {
        let mut base = TemplateLibrary::new();
        base.insert("shared", Pool::from("base version"));
        base.insert("base_only", Pool::from("only in base"));

        let mut overrides = TemplateLibrary::new();
        overrides.insert("shared", Pool::from(vec!["override version"]));

        base.merge(overrides);

        // Override took precedence
        assert_eq!(base.get("shared"), Some(&Pool::from(vec!["override version"])));
        // Base-only entry still present
        assert!(base.contains("base_only"));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn ron_round_trip() {
        let mut lib = TemplateLibrary::new();
        lib.insert("twist", Pool::from(vec!["The ?{witness} lied."]));
        let serialized = ron::to_string(&lib).unwrap();
        let back = TemplateLibrary::parse_ron(&serialized).unwrap();
        assert_eq!(back, lib);
    }

    #[test]
    fn default_is_empty() {
        assert!(TemplateLibrary::default().is_empty());
    }
}
