//! TOML component catalogs.
//!
//! A catalog declares component types by qualified name. Children refer to
//! other declared types by name, so a catalog is resolved into a shared
//! [`ComponentType`] tree on demand:
//!
//! ```toml
//! [[component]]
//! name = "tb.Top"
//! role = "plain"
//! children = [{ name = "dut", type = "tb.Counter" }, { name = "xtor", type = "tb.ClockXtor" }]
//! bindings = [["xtor.clock", "dut.clock"]]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::{Binding, ComponentType, Port, Protocol, SourceFileset};
use crate::error::{ModelError, Result};
use crate::types::{Role, Signal};

/// A port as written in a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDecl {
    pub name: String,
    #[serde(flatten)]
    pub signal: Signal,
}

/// A child instance as written in a catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// One `[[component]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDecl {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub ports: Vec<PortDecl>,
    #[serde(default)]
    pub children: Vec<ChildDecl>,
    #[serde(default)]
    pub bindings: Vec<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fileset: Option<SourceFileset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    component: Vec<ComponentDecl>,
}

/// A set of component declarations keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    decls: BTreeMap<String, ComponentDecl>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let mut catalog = TypeCatalog::new();
        for decl in file.component {
            catalog.insert(decl)?;
        }
        Ok(catalog)
    }

    /// Load a catalog file. Relative fileset paths default to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModelError::CatalogNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let mut catalog = Self::parse(&text)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            let base = dir.to_string_lossy().into_owned();
            for decl in catalog.decls.values_mut() {
                if let Some(fs) = decl.fileset.as_mut() {
                    fs.basedir.get_or_insert_with(|| base.clone());
                }
            }
        }
        debug!(path = %path.display(), types = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Add a declaration; names must be unique across the catalog.
    pub fn insert(&mut self, decl: ComponentDecl) -> Result<()> {
        if self.decls.contains_key(&decl.name) {
            return Err(ModelError::DuplicateType { name: decl.name });
        }
        self.decls.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Merge another catalog into this one.
    pub fn extend(&mut self, other: TypeCatalog) -> Result<()> {
        for decl in other.decls.into_values() {
            self.insert(decl)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decls.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Build the descriptor tree rooted at `name`.
    ///
    /// Types referenced more than once share a single `Arc`.
    pub fn resolve(&self, name: &str) -> Result<Arc<ComponentType>> {
        let mut memo = HashMap::new();
        let mut stack = Vec::new();
        self.resolve_inner(name, &mut memo, &mut stack)
    }

    fn resolve_inner(
        &self,
        name: &str,
        memo: &mut HashMap<String, Arc<ComponentType>>,
        stack: &mut Vec<String>,
    ) -> Result<Arc<ComponentType>> {
        if let Some(done) = memo.get(name) {
            return Ok(Arc::clone(done));
        }
        if stack.iter().any(|s| s == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(ModelError::RecursiveType {
                chain: chain.join(" -> "),
            });
        }
        let decl = self
            .decls
            .get(name)
            .ok_or_else(|| ModelError::UnknownType {
                name: name.to_string(),
            })?;

        stack.push(name.to_string());
        let mut ty = ComponentType::new(decl.name.clone(), decl.role);
        ty.ports = decl
            .ports
            .iter()
            .map(|p| Port {
                name: p.name.clone(),
                signal: p.signal,
            })
            .collect();
        for child in &decl.children {
            let component = self.resolve_inner(&child.type_name, memo, stack)?;
            ty = match child.count {
                Some(n) => ty.with_array(child.name.clone(), component, n),
                None => ty.with_child(child.name.clone(), component),
            };
        }
        ty.bindings = decl
            .bindings
            .iter()
            .map(|[l, r]| Binding::parse(l, r))
            .collect::<Result<Vec<_>>>()?;
        ty.fileset = decl.fileset.clone();
        ty.typename = decl.typename.clone();
        ty.protocol = decl.protocol.clone();
        stack.pop();

        let ty = Arc::new(ty);
        memo.insert(name.to_string(), Arc::clone(&ty));
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Direction};

    const CLOCKED_COUNTER: &str = r#"
[[component]]
name = "tb.Counter"
role = "extern"
typename = "counter"
ports = [
  { name = "clock", direction = "input" },
  { name = "count", direction = "output", width = 32 },
]
fileset = { sources = ["counter.sv"] }

[[component]]
name = "tb.ClockXtor"
role = "transactor"
ports = [{ name = "clock", direction = "output" }]

[[component.protocol.methods]]
name = "tick"
params = [{ name = "cycles", type = "u32" }]

[[component.protocol.methods]]
name = "count"
returns = "u32"
blocking = false

[[component]]
name = "tb.Top"
role = "plain"
children = [
  { name = "dut", type = "tb.Counter" },
  { name = "xtor", type = "tb.ClockXtor" },
]
bindings = [["xtor.clock", "dut.clock"]]
"#;

    #[test]
    fn resolve_tree() {
        let catalog = TypeCatalog::parse(CLOCKED_COUNTER).unwrap();
        assert_eq!(catalog.len(), 3);

        let top = catalog.resolve("tb.Top").unwrap();
        assert_eq!(top.role, Role::Plain);
        assert_eq!(top.children.len(), 2);
        assert_eq!(top.bindings[0].to_string(), "(xtor.clock, dut.clock)");

        let dut = &top.child("dut").unwrap().component;
        assert_eq!(dut.hdl_name(), "counter");
        assert_eq!(dut.port("count").unwrap().signal.width, 32);
        assert_eq!(dut.port("clock").unwrap().signal.direction, Direction::Input);

        let xtor = &top.child("xtor").unwrap().component;
        let proto = xtor.protocol.as_ref().unwrap();
        assert_eq!(proto.methods[0].params[0].ty, DataType::u32());
        assert_eq!(proto.methods[0].returns, DataType::Void);
        assert!(proto.methods[0].blocking);
        assert!(!proto.methods[1].blocking);
    }

    #[test]
    fn shared_types_resolve_once() {
        let text = r#"
[[component]]
name = "a.Leaf"
role = "extern"
fileset = { sources = ["leaf.sv"] }

[[component]]
name = "a.Pair"
role = "plain"
children = [{ name = "x", type = "a.Leaf" }, { name = "y", type = "a.Leaf", count = 2 }]
"#;
        let pair = TypeCatalog::parse(text).unwrap().resolve("a.Pair").unwrap();
        assert!(Arc::ptr_eq(&pair.children[0].component, &pair.children[1].component));
        assert_eq!(pair.children[1].count, Some(2));
    }

    #[test]
    fn unknown_and_recursive_types() {
        let text = r#"
[[component]]
name = "a.Loop"
role = "plain"
children = [{ name = "self_", type = "a.Loop" }]

[[component]]
name = "a.Dangling"
role = "plain"
children = [{ name = "x", type = "a.Missing" }]
"#;
        let catalog = TypeCatalog::parse(text).unwrap();
        assert!(matches!(
            catalog.resolve("a.Loop"),
            Err(ModelError::RecursiveType { chain }) if chain == "a.Loop -> a.Loop"
        ));
        assert!(matches!(
            catalog.resolve("a.Dangling"),
            Err(ModelError::UnknownType { name }) if name == "a.Missing"
        ));
    }

    #[test]
    fn bad_binding_text() {
        let text = r#"
[[component]]
name = "a.Top"
role = "plain"
bindings = [["x..clock", "y.clock"]]
"#;
        let catalog = TypeCatalog::parse(text).unwrap();
        assert!(matches!(
            catalog.resolve("a.Top"),
            Err(ModelError::InvalidPortRef { .. })
        ));
    }

    #[test]
    fn duplicate_declarations() {
        let mut catalog = TypeCatalog::parse(CLOCKED_COUNTER).unwrap();
        let again = TypeCatalog::parse(CLOCKED_COUNTER).unwrap();
        assert!(matches!(
            catalog.extend(again),
            Err(ModelError::DuplicateType { .. })
        ));
    }

    #[test]
    fn load_sets_basedir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, CLOCKED_COUNTER).unwrap();

        let catalog = TypeCatalog::load(&path).unwrap();
        let top = catalog.resolve("tb.Top").unwrap();
        let fs = top.child("dut").unwrap().component.fileset.clone().unwrap();
        let expected = dir.path().join("counter.sv").to_string_lossy().into_owned();
        assert_eq!(fs.resolved_sources(), vec![expected]);

        assert!(matches!(
            TypeCatalog::load(&dir.path().join("missing.toml")),
            Err(ModelError::CatalogNotFound { .. })
        ));
    }
}
