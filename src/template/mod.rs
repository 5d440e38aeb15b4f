//! Named templates: parsing, execution and the shared registry
//!
//! Templates are plain text with `{{ ... }}` actions that substitute values
//! from an [`Arguments`](crate::Arguments) mapping.
//!
//! # Example
//!
//! ```rust
//! use prompt_templates::{Arguments, TemplateRegistry};
//!
//! let registry = TemplateRegistry::new();
//! registry.register("greet", "Hello, {{.Name}}!").unwrap();
//!
//! let renderer = registry.lookup("greet").unwrap();
//! let args = Arguments::new().with("Name", "World");
//! let out = renderer.render("", &args).unwrap();
//! assert_eq!(out["prompt"], "Hello, World!");
//! ```

mod compiled;
mod registry;

pub use compiled::{ExecError, Template};
pub use registry::{RegistryError, RenderResult, Renderer, TemplateRegistry, PROMPT_KEY};
