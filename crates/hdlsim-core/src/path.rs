//! Instance paths and port references.
//!
//! An [`InstPath`] names an instance relative to some enclosing component,
//! e.g. `env.xtors[1]`. The empty path names the enclosing component itself.
//! A [`PortRef`] is an instance path plus a port name (`env.xtors[1].req`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One step of an instance path: a child name plus an optional array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<usize>,
}

impl PathSegment {
    pub fn new(name: impl Into<String>) -> Self {
        PathSegment {
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        PathSegment {
            name: name.into(),
            index: Some(index),
        }
    }

    /// Hardware identifier fragment: `name` or `name_<index>`.
    pub fn ident(&self) -> String {
        match self.index {
            Some(i) => format!("{}_{i}", self.name),
            None => self.name.clone(),
        }
    }

    fn parse(text: &str, whole: &str) -> Result<Self> {
        let invalid = |detail: &str| ModelError::InvalidPortRef {
            text: whole.to_string(),
            detail: detail.to_string(),
        };
        let (name, index) = match text.split_once('[') {
            Some((name, rest)) => {
                let digits = rest
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("unterminated index"))?;
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| invalid("index is not a number"))?;
                (name, Some(index))
            }
            None => (text, None),
        };
        if !is_identifier(name) {
            return Err(invalid("segment is not an identifier"));
        }
        Ok(PathSegment {
            name: name.to_string(),
            index,
        })
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A path of child instances relative to some enclosing component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstPath(Vec<PathSegment>);

impl InstPath {
    /// The empty path (the enclosing component itself).
    pub fn root() -> Self {
        InstPath(Vec::new())
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        InstPath(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        InstPath(segments)
    }

    /// Concatenate two relative paths.
    pub fn join(&self, other: &InstPath) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        InstPath(segments)
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Flattened hardware identifier: segments joined by `__`
    /// (`env.xtors[1]` → `env__xtors_1`). Empty for the root path.
    pub fn hdl_ident(&self) -> String {
        self.0
            .iter()
            .map(PathSegment::ident)
            .collect::<Vec<_>>()
            .join("__")
    }

    /// Absolute dotted path under `prefix` (`top` + `env.xtor` → `top.env.xtor`).
    pub fn under(&self, prefix: &str) -> String {
        if self.0.is_empty() {
            prefix.to_string()
        } else if prefix.is_empty() {
            self.to_string()
        } else {
            format!("{prefix}.{self}")
        }
    }

    /// Registry key under `prefix`: the dotted path without the final index,
    /// plus that index (0 for scalar instances).
    pub fn registry_key(&self, prefix: &str) -> (String, usize) {
        match self.0.split_last() {
            Some((last, parents)) => {
                let mut path = InstPath(parents.to_vec()).under(prefix);
                if path.is_empty() {
                    path = last.name.clone();
                } else {
                    path.push('.');
                    path.push_str(&last.name);
                }
                (path, last.index.unwrap_or(0))
            }
            None => (prefix.to_string(), 0),
        }
    }
}

impl fmt::Display for InstPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

/// A reference to a port: `(instance_path, port_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortRef {
    pub instance: InstPath,
    pub port: String,
}

impl PortRef {
    pub fn new(instance: InstPath, port: impl Into<String>) -> Self {
        PortRef {
            instance,
            port: port.into(),
        }
    }

    /// Parse `a.b[2].port` (or just `port` for the enclosing component).
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut parts: Vec<&str> = trimmed.split('.').collect();
        let port = parts.pop().unwrap_or_default();
        if !is_identifier(port) {
            return Err(ModelError::InvalidPortRef {
                text: text.to_string(),
                detail: "port name is not an identifier".to_string(),
            });
        }
        let segments = parts
            .into_iter()
            .map(|seg| PathSegment::parse(seg, text))
            .collect::<Result<Vec<_>>>()?;
        Ok(PortRef {
            instance: InstPath(segments),
            port: port.to_string(),
        })
    }

    /// Whether this references a port of the enclosing component itself.
    pub fn is_self(&self) -> bool {
        self.instance.is_root()
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance.is_root() {
            write!(f, "{}", self.port)
        } else {
            write!(f, "{}.{}", self.instance, self.port)
        }
    }
}

impl FromStr for PortRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        PortRef::parse(s)
    }
}

impl TryFrom<String> for PortRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        PortRef::parse(&value)
    }
}

impl From<PortRef> for String {
    fn from(value: PortRef) -> Self {
        value.to_string()
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
