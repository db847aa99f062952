//! Run configuration and typed config-file loading.

use crate::docs::{
    DIAGRAM_KEYWORDS, GLOSSARY_FILE, REFERENCES_FILE, REQUIRED_FRONTMATTER_FIELDS,
    REQUIRED_GLOSSARY_TERMS,
};
use crate::runtime::error::{QaError, QaResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

const DEFAULT_SAMPLE_LIMIT: usize = 10;

/// Generic TOML-backed config loader.
///
/// `ConfigLoader<T>` handles only filesystem access and TOML deserialization. Callers are still
/// responsible for applying the typed value to a [`QaConfig`].
///
/// ```rust
/// # use std::path::Path;
/// # use notes_qa::runtime::config::{ConfigLoader, ConfigOverrides};
/// let loader = ConfigLoader::<ConfigOverrides>::new(Path::new("/kb/notes-qa.toml"));
/// assert_eq!(loader.path(), Path::new("/kb/notes-qa.toml"));
/// ```
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Create a loader for the given config file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the configuration file.
    ///
    /// Missing files, unreadable files, and TOML parse failures are all surfaced as
    /// [`QaErrorCategory::Config`](crate::runtime::error::QaErrorCategory::Config).
    pub fn load(&self) -> QaResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|err| {
            QaError::config(format!("failed to read {}: {err}", self.path.display()))
        })?;
        toml::from_str(&body).map_err(|err| {
            QaError::config(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    /// Return the config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Optional overrides read from a `notes-qa.toml` file.
///
/// Every field is optional; absent fields keep the compiled-in defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub sample_limit: Option<usize>,
    pub glossary_file: Option<String>,
    pub references_file: Option<String>,
    pub required_terms: Option<Vec<String>>,
    pub required_fields: Option<Vec<String>>,
    pub diagram_keywords: Option<Vec<String>>,
}

/// Explicit configuration for one QA run.
///
/// The content root and canonical directory are plain values so fixtures can point a run at any
/// directory tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QaConfig {
    /// Directory scanned for `*.md` files.
    pub content_root: PathBuf,
    /// Directory holding the canonical glossary and references documents.
    pub canonical_dir: PathBuf,
    pub glossary_file: String,
    pub references_file: String,
    /// Terms the glossary must cover (compared lower-cased).
    pub required_terms: Vec<String>,
    pub required_fields: Vec<String>,
    pub diagram_keywords: Vec<String>,
    /// Sample issues printed per check before eliding the rest.
    pub sample_limit: usize,
}

impl QaConfig {
    /// Build the default configuration rooted at `content_root`.
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        let content_root = content_root.into();
        Self {
            canonical_dir: content_root.clone(),
            content_root,
            glossary_file: GLOSSARY_FILE.to_string(),
            references_file: REFERENCES_FILE.to_string(),
            required_terms: owned(REQUIRED_GLOSSARY_TERMS),
            required_fields: owned(REQUIRED_FRONTMATTER_FIELDS),
            diagram_keywords: owned(DIAGRAM_KEYWORDS),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    /// Use a canonical directory other than the content root.
    pub fn with_canonical_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.canonical_dir = dir.into();
        self
    }

    /// Apply file-level overrides on top of the current values.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(limit) = overrides.sample_limit {
            self.sample_limit = limit;
        }
        if let Some(name) = overrides.glossary_file {
            self.glossary_file = name;
        }
        if let Some(name) = overrides.references_file {
            self.references_file = name;
        }
        if let Some(terms) = overrides.required_terms {
            self.required_terms = terms;
        }
        if let Some(fields) = overrides.required_fields {
            self.required_fields = fields;
        }
        if let Some(keywords) = overrides.diagram_keywords {
            self.diagram_keywords = keywords;
        }
    }

    /// Load overrides from a TOML file and apply them.
    pub fn apply_file(&mut self, path: &Path) -> QaResult<()> {
        let overrides = ConfigLoader::<ConfigOverrides>::new(path)
            .load()
            .map_err(|err| err.with_operation("load config"))?;
        self.apply(overrides);
        Ok(())
    }

    pub fn glossary_path(&self) -> PathBuf {
        self.canonical_dir.join(&self.glossary_file)
    }

    pub fn references_path(&self) -> PathBuf {
        self.canonical_dir.join(&self.references_file)
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
