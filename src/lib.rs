//! Prompt Templates - a registry of named, pre-parsed text templates
//!
//! Templates are registered once under a unique name, from a string or a
//! file, and rendered many times against varying arguments. The registry is
//! safe to share between threads: lookups proceed in parallel and only
//! registration takes the exclusive lock.
//!
//! # Example
//!
//! ```rust
//! use prompt_templates::{Arguments, TemplateRegistry};
//!
//! let registry = TemplateRegistry::new();
//! registry.register("greet", "Hello, {{.Name}}!").unwrap();
//!
//! let out = registry
//!     .lookup("greet")
//!     .unwrap()
//!     .render("", &Arguments::new().with("Name", "World"))
//!     .unwrap();
//!
//! assert_eq!(out["prompt"], "Hello, World!");
//! ```

pub mod arguments;
pub mod error;
pub mod manifest;
pub mod parser;
pub mod template;

pub use arguments::{parse_assignment, Arguments, ArgumentsError, Value};
pub use error::ParseError;
pub use manifest::{Manifest, ManifestError};
pub use template::{
    ExecError, RegistryError, RenderResult, Renderer, Template, TemplateRegistry, PROMPT_KEY,
};

use thiserror::Error;

/// Errors from one-shot rendering with [`render`]
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during parsing
    #[error("parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// Error during execution
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse and execute template source in one step, without a registry
///
/// # Example
///
/// ```rust
/// use prompt_templates::{render, Arguments};
///
/// let args = Arguments::new().with("Name", "World");
/// assert_eq!(render("Hi {{.Name}}", &args).unwrap(), "Hi World");
/// ```
pub fn render(source: &str, args: &Arguments) -> Result<String, RenderError> {
    let template = Template::parse("inline", source)?;
    Ok(template.execute(args)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_one_shot() {
        let args = Arguments::new().with("Who", "you");
        assert_eq!(render("Thank {{ .Who }}.", &args).unwrap(), "Thank you.");
    }

    #[test]
    fn test_render_parse_error() {
        let result = render("{{ .Who", &Arguments::new());
        assert!(matches!(result, Err(RenderError::Parse(_))));
    }

    #[test]
    fn test_render_rejects_space_separated_fields() {
        let user = Arguments::new().with("Name", "Ada");
        let args = Arguments::new().with("User", user);
        assert!(matches!(
            render("{{ .User .Name }}", &args),
            Err(RenderError::Parse(_))
        ));
        assert_eq!(render("{{ .User.Name }}", &args).unwrap(), "Ada");
    }

    #[test]
    fn test_render_comment_with_trailing_stars() {
        assert_eq!(render("a{{/* note **/}}b", &Arguments::new()).unwrap(), "ab");
    }

    #[test]
    fn test_render_unicode_field() {
        let args = Arguments::new().with("Año", 2024i64);
        assert_eq!(render("{{ .Año }}", &args).unwrap(), "2024");
    }

    #[test]
    fn test_render_exec_error() {
        let result = render("{{ .Who }}", &Arguments::new());
        assert!(matches!(result, Err(RenderError::Exec(ExecError::MissingKey { .. }))));
    }
}
