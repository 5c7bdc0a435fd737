//! Component descriptors.
//!
//! A [`ComponentType`] is the static description of one component class:
//! its role, ports, child instances, declared bindings, source fileset and,
//! for transactors, the protocol it exposes to the host domain.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::path::{InstPath, PathSegment, PortRef};
use crate::types::{DataType, Direction, Role, Signal};

/// A named port of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub signal: Signal,
}

/// A child instance declared by a component.
#[derive(Debug, Clone)]
pub struct ChildInstance {
    pub name: String,
    pub component: Arc<ComponentType>,
    /// Array size, `None` for a scalar instance.
    pub count: Option<usize>,
}

impl ChildInstance {
    /// Path segments of every element this child expands to.
    pub fn elements(&self) -> Vec<PathSegment> {
        match self.count {
            Some(n) => (0..n)
                .map(|i| PathSegment::indexed(self.name.clone(), i))
                .collect(),
            None => vec![PathSegment::new(self.name.clone())],
        }
    }
}

/// A declared connection between two ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub left: PortRef,
    pub right: PortRef,
}

impl Binding {
    pub fn new(left: PortRef, right: PortRef) -> Self {
        Binding { left, right }
    }

    /// Parse both endpoints from their text form.
    pub fn parse(left: &str, right: &str) -> Result<Self> {
        Ok(Binding {
            left: PortRef::parse(left)?,
            right: PortRef::parse(right)?,
        })
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}

/// Hardware source files attached to an Extern or Transactor type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileset {
    /// Directory that relative file names are resolved against.
    #[serde(default)]
    pub basedir: Option<String>,
    /// Package files; compiled before everything else.
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub incdirs: Vec<String>,
    /// `NAME` or `NAME=VALUE` macro definitions.
    #[serde(default)]
    pub defines: Vec<String>,
}

impl SourceFileset {
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceFileset {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// True when the fileset names no compilable file.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.sources.is_empty()
    }

    fn resolve(&self, file: &str) -> String {
        match &self.basedir {
            Some(base) if !Path::new(file).is_absolute() => {
                Path::new(base).join(file).to_string_lossy().into_owned()
            }
            _ => file.to_string(),
        }
    }

    pub fn resolved_packages(&self) -> Vec<String> {
        self.packages.iter().map(|f| self.resolve(f)).collect()
    }

    pub fn resolved_sources(&self) -> Vec<String> {
        self.sources.iter().map(|f| self.resolve(f)).collect()
    }

    pub fn resolved_incdirs(&self) -> Vec<String> {
        self.incdirs.iter().map(|f| self.resolve(f)).collect()
    }
}

/// One parameter of a protocol method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: DataType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Param {
            name: name.into(),
            ty,
        }
    }
}

/// Signature of one protocol method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default = "void", rename = "returns")]
    pub returns: DataType,
    /// Blocking methods may consume simulation time.
    #[serde(default = "yes")]
    pub blocking: bool,
}

fn void() -> DataType {
    DataType::Void
}

fn yes() -> bool {
    true
}

impl MethodSig {
    pub fn new(name: impl Into<String>) -> Self {
        MethodSig {
            name: name.into(),
            params: Vec::new(),
            returns: DataType::Void,
            blocking: true,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: DataType) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    pub fn returns(mut self, ty: DataType) -> Self {
        self.returns = ty;
        self
    }

    pub fn non_blocking(mut self) -> Self {
        self.blocking = false;
        self
    }
}

/// The callable surface a transactor exposes to the host domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protocol {
    #[serde(default)]
    pub methods: Vec<MethodSig>,
}

impl Protocol {
    pub fn new(methods: Vec<MethodSig>) -> Self {
        Protocol { methods }
    }

    /// Look up a method and its index (the method identity on the wire).
    pub fn method(&self, name: &str) -> Option<(usize, &MethodSig)> {
        self.methods
            .iter()
            .enumerate()
            .find(|(_, m)| m.name == name)
    }
}

/// Static descriptor of a component class.
#[derive(Debug, Clone)]
pub struct ComponentType {
    /// Fully qualified name (`pkg.Type`).
    pub name: String,
    pub role: Role,
    pub ports: Vec<Port>,
    pub children: Vec<ChildInstance>,
    pub bindings: Vec<Binding>,
    pub fileset: Option<SourceFileset>,
    /// Name of the pre-existing hardware module an Extern stands for.
    pub typename: Option<String>,
    pub protocol: Option<Protocol>,
}

impl ComponentType {
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        ComponentType {
            name: name.into(),
            role,
            ports: Vec::new(),
            children: Vec::new(),
            bindings: Vec::new(),
            fileset: None,
            typename: None,
            protocol: None,
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, Role::Plain)
    }

    pub fn extern_module(name: impl Into<String>) -> Self {
        Self::new(name, Role::Extern)
    }

    pub fn transactor(name: impl Into<String>, protocol: Protocol) -> Self {
        let mut ty = Self::new(name, Role::Transactor);
        ty.protocol = Some(protocol);
        ty
    }

    pub fn with_port(mut self, name: impl Into<String>, direction: Direction, width: u32) -> Self {
        self.ports.push(Port {
            name: name.into(),
            signal: Signal { direction, width },
        });
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, component: Arc<ComponentType>) -> Self {
        self.children.push(ChildInstance {
            name: name.into(),
            component,
            count: None,
        });
        self
    }

    pub fn with_array(
        mut self,
        name: impl Into<String>,
        component: Arc<ComponentType>,
        count: usize,
    ) -> Self {
        self.children.push(ChildInstance {
            name: name.into(),
            component,
            count: Some(count),
        });
        self
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn with_fileset(mut self, fileset: SourceFileset) -> Self {
        self.fileset = Some(fileset);
        self
    }

    pub fn with_typename(mut self, typename: impl Into<String>) -> Self {
        self.typename = Some(typename.into());
        self
    }

    /// Unqualified type name (`pkg.mod.Counter` → `Counter`).
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Name of the hardware module implementing this component.
    pub fn hdl_name(&self) -> &str {
        match (&self.role, &self.typename) {
            (Role::Extern, Some(typename)) => typename,
            _ => self.short_name(),
        }
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&ChildInstance> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the fileset names at least one compilable file.
    pub fn has_sources(&self) -> bool {
        self.fileset.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Walk `path` down the child tree and return the component it names.
    pub fn resolve(&self, path: &InstPath) -> Result<&ComponentType> {
        let mut current = self;
        for seg in path.segments() {
            let child = current
                .child(&seg.name)
                .ok_or_else(|| ModelError::UnknownInstance {
                    component: current.name.clone(),
                    segment: seg.name.clone(),
                })?;
            match (child.count, seg.index) {
                (Some(count), Some(index)) if index >= count => {
                    return Err(ModelError::IndexOutOfRange {
                        segment: seg.name.clone(),
                        index,
                        count,
                    });
                }
                (Some(_), None) => {
                    return Err(ModelError::MissingIndex {
                        segment: seg.name.clone(),
                    });
                }
                (None, Some(_)) => {
                    return Err(ModelError::UnexpectedIndex {
                        segment: seg.name.clone(),
                    });
                }
                _ => {}
            }
            current = &child.component;
        }
        Ok(current)
    }
}
