//! Template registry for storing named templates and handing out renderers

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::arguments::Arguments;
use crate::manifest::Manifest;
use crate::template::compiled::{ExecError, Template};
use crate::ParseError;

/// Key of the single entry in a renderer's output
pub const PROMPT_KEY: &str = "prompt";

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Template names must be non-empty
    #[error("template name must not be empty")]
    EmptyName,

    /// Template source failed to parse
    #[error("failed to parse template {name}: {}", format_parse_errors(.errors))]
    Parse {
        name: String,
        errors: Vec<ParseError>,
    },

    /// Duplicate template definition
    #[error("duplicate template definition: {name}")]
    Duplicate { name: String },

    /// Error reading a template file
    #[error("error reading template file {} for {name}: {source}", .path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template failed to execute against the supplied arguments
    #[error("failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: ExecError,
    },
}

impl RegistryError {
    /// Name of the template the error concerns, if any
    pub fn template_name(&self) -> Option<&str> {
        match self {
            RegistryError::EmptyName => None,
            RegistryError::Parse { name, .. }
            | RegistryError::Duplicate { name }
            | RegistryError::Io { name, .. }
            | RegistryError::Render { name, .. } => Some(name),
        }
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Output of a renderer: `{"prompt": <rendered text>}`
pub type RenderResult = Result<HashMap<String, String>, RegistryError>;

/// Callable bound to one registered template.
///
/// Cloning is cheap; every clone renders the same parsed template.
#[derive(Clone)]
pub struct Renderer {
    name: Arc<str>,
    render: Arc<dyn Fn(&str, &Arguments) -> RenderResult + Send + Sync>,
}

impl Renderer {
    fn new(template: Arc<Template>) -> Self {
        let name: Arc<str> = Arc::from(template.name());
        let render = move |_prompt: &str, args: &Arguments| -> RenderResult {
            let text = template
                .execute(args)
                .map_err(|source| RegistryError::Render {
                    name: template.name().to_string(),
                    source,
                })?;
            debug!(template = template.name(), bytes = text.len(), "rendered template");
            Ok(HashMap::from([(PROMPT_KEY.to_string(), text)]))
        };

        Self {
            name,
            render: Arc::new(render),
        }
    }

    /// Name the template was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the template against `args`.
    ///
    /// Returns `{"prompt": <rendered text>}`. The `prompt` parameter is
    /// accepted for call-site uniformity and does not feed the template.
    pub fn render(&self, prompt: &str, args: &Arguments) -> RenderResult {
        (self.render)(prompt, args)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer").field("name", &self.name).finish()
    }
}

/// A registered template: the parsed form and the renderer closing over it
#[derive(Debug)]
struct Entry {
    template: Arc<Template>,
    renderer: Renderer,
}

/// Thread-safe registry of named templates.
///
/// Names are write-once: a registered template can never be replaced or
/// removed. Lookups take a shared lock; registration takes the exclusive
/// lock only for the map insert, after parsing and file I/O are done.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    entries: RwLock<HashMap<String, Entry>>,
    /// Base path for resolving relative file paths
    base_path: Option<PathBuf>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new registry with a base path for file resolution
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            base_path: Some(base_path.into()),
        }
    }

    /// Resolve a relative path against the base path
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Parse `content` and register it under `name`
    pub fn register(&self, name: &str, content: &str) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let template = Template::parse(name, content).map_err(|errors| RegistryError::Parse {
            name: name.to_string(),
            errors,
        })?;
        let template = Arc::new(template);
        let entry = Entry {
            renderer: Renderer::new(Arc::clone(&template)),
            template,
        };

        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
            });
        }
        entries.insert(name.to_string(), entry);
        drop(entries);

        debug!(template = name, "registered template");
        Ok(())
    }

    /// Read the file at `path` and register its contents under `name`
    pub fn register_from_file(
        &self,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), RegistryError> {
        let full_path = self.resolve_path(path.as_ref());
        let io_error = |source: std::io::Error| RegistryError::Io {
            name: name.to_string(),
            path: full_path.clone(),
            source,
        };

        let bytes = std::fs::read(&full_path).map_err(io_error)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            io_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        self.register(name, &content)
    }

    /// Register every template declared in a manifest.
    ///
    /// Inline templates are registered first, then file templates, each in
    /// name order. Stops at the first failure; templates registered before
    /// it stay registered. Returns the number of templates registered.
    pub fn load_manifest(&self, manifest: &Manifest) -> Result<usize, RegistryError> {
        let mut count = 0;
        for (name, content) in &manifest.templates {
            self.register(name, content)?;
            count += 1;
        }
        for (name, path) in &manifest.files {
            self.register_from_file(name, manifest.resolve_path(path))?;
            count += 1;
        }
        Ok(count)
    }

    /// Get the renderer for a template by name
    pub fn lookup(&self, name: &str) -> Option<Renderer> {
        let renderer = self
            .entries
            .read()
            .get(name)
            .map(|entry| entry.renderer.clone());
        if renderer.is_none() {
            debug!(template = name, "template not found");
        }
        renderer
    }

    /// Placeholders the named template substitutes, e.g. `.User.Name`
    pub fn placeholders(&self, name: &str) -> Option<Vec<String>> {
        self.entries
            .read()
            .get(name)
            .map(|entry| entry.template.fields().map(|f| f.to_string()).collect())
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Snapshot of all template names, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
