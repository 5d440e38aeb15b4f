//! Parsed templates and their execution

use thiserror::Error;

use crate::arguments::{Arguments, Value};
use crate::parser::{self, FieldPath, Node, Span};
use crate::ParseError;

/// Errors raised while executing a parsed template against arguments
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecError {
    /// A path segment is not present in the arguments
    #[error("no entry for key {path} at {span:?}")]
    MissingKey { path: String, span: Span },

    /// A path tried to index into something that is not a map
    #[error("can't evaluate field {field} in {path}: value is not a map")]
    NotAMap {
        path: String,
        field: String,
        span: Span,
    },
}

/// A template parsed once and executed many times
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source under the given name
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, Vec<ParseError>> {
        let nodes = parser::parse(source)?;
        Ok(Self {
            name: name.into(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of every field the template substitutes, in order of appearance
    pub fn fields(&self) -> impl Iterator<Item = &FieldPath> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Field(path) => Some(&path.node),
            Node::Text(_) => None,
        })
    }

    /// Execute the template against `args`
    pub fn execute(&self, args: &Arguments) -> Result<String, ExecError> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Field(path) => {
                    if path.node.is_root() {
                        out.push_str(&args.to_string());
                    } else {
                        let value = resolve(args, &path.node, &path.span)?;
                        out.push_str(&value.to_string());
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Walk a non-root path through the arguments
fn resolve<'a>(args: &'a Arguments, path: &FieldPath, span: &Span) -> Result<&'a Value, ExecError> {
    let segments = path.segments();
    let missing = |depth: usize| ExecError::MissingKey {
        path: FieldPath::new(segments[..=depth].to_vec()).to_string(),
        span: span.clone(),
    };

    let mut current = args.get(&segments[0]).ok_or_else(|| missing(0))?;
    for (depth, segment) in segments.iter().enumerate().skip(1) {
        if !current.is_map() {
            return Err(ExecError::NotAMap {
                path: FieldPath::new(segments[..depth].to_vec()).to_string(),
                field: segment.clone(),
                span: span.clone(),
            });
        }
        current = current.get(segment).ok_or_else(|| missing(depth))?;
    }
    Ok(current)
}
