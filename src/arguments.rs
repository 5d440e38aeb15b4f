//! Render-time arguments
//!
//! Arguments are the context mapping a template is executed against. Values
//! can be nested, so `{{.User.Name}}` walks into a map stored under `User`.
//! Argument sets can be built in code or loaded from TOML.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading arguments
#[derive(Error, Debug)]
pub enum ArgumentsError {
    #[error("Failed to read arguments file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse arguments TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A single argument value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Look up a key if this value is a map
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }
}

/// Formats values the way they appear in rendered output:
/// lists as `[a b]`, maps as `map[k:v]` with sorted keys.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => fmt_map(f, map),
        }
    }
}

fn fmt_map(f: &mut fmt::Formatter<'_>, map: &BTreeMap<String, Value>) -> fmt::Result {
    f.write_str("map[")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}:{}", key, value)?;
    }
    f.write_str("]")
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Arguments> for Value {
    fn from(args: Arguments) -> Self {
        Value::Map(args.0)
    }
}

/// The key-value context a template is executed against
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Arguments(BTreeMap<String, Value>);

impl Arguments {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Load arguments from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ArgumentsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load arguments from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ArgumentsError> {
        Ok(toml::from_str(content)?)
    }

    /// Insert a value, returning the previous one under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every entry of `other` into this set, overriding existing keys
    pub fn extend(&mut self, other: Arguments) {
        self.0.extend(other.0);
    }

    /// Load arguments from an optional TOML file, then apply string
    /// assignments on top. Later assignments win over earlier ones and over
    /// the file.
    pub fn load(
        path: Option<&Path>,
        assignments: &[(String, String)],
    ) -> Result<Self, ArgumentsError> {
        let mut args = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        args.extend(
            assignments
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect(),
        );
        Ok(args)
    }
}

/// Parse a `KEY=VALUE` assignment. The value may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_map(f, &self.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
