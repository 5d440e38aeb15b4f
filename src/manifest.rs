//! Manifests for registering many templates at once
//!
//! ```toml
//! [templates]
//! greet = "Hello, {{.Name}}!"
//!
//! [files]
//! summary = "prompts/summary.tmpl"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse manifest TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Template declarations loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    /// Inline templates: name -> source
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    /// File templates: name -> path
    #[serde(default)]
    pub files: BTreeMap<String, PathBuf>,
    /// Directory relative file paths are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest from a TOML file.
    ///
    /// Relative paths under `[files]` resolve against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest = Self::from_str(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Load a manifest from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    /// Number of templates declared
    pub fn len(&self) -> usize {
        self.templates.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a `[files]` path against the manifest directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
