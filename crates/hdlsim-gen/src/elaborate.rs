//! Hardware elaboration: which instances the wiring module holds and how
//! their ports are connected.
//!
//! Starting at the root, every Extern and Transactor child is collected
//! without descending into Plain subtrees. Extern composites that carry no
//! source files have no module of their own; they are flattened and their
//! children are instanced directly, with their own ports acting as
//! pass-through points between the outer and inner bindings.
//!
//! Bindings whose endpoints both live in the hardware domain are merged
//! with a union-find over `(instance path, port)` keys. Each resulting
//! group becomes one net.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use hdlsim_core::{Binding, ComponentType, Direction, InstPath, PortRef, Role, Signal};
use tracing::debug;

use crate::error::{GenError, Result};
use crate::fileset::OrderedSet;

/// One module instance inside `<Root>_hdl`.
#[derive(Debug, Clone)]
pub struct HdlInstance {
    pub path: InstPath,
    pub component: Arc<ComponentType>,
}

impl HdlInstance {
    /// Instance identifier derived from the path (`a.b[2]` → `a__b_2`).
    pub fn ident(&self) -> String {
        self.path.hdl_ident()
    }

    pub fn module_name(&self) -> &str {
        self.component.hdl_name()
    }

    pub fn is_transactor(&self) -> bool {
        self.component.role == Role::Transactor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetKind {
    /// Single driver.
    Logic,
    /// At least one bidirectional member.
    Wire,
}

impl NetKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            NetKind::Logic => "logic",
            NetKind::Wire => "wire",
        }
    }
}

/// A declared net connecting a group of instance ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    pub name: String,
    pub width: u32,
    pub kind: NetKind,
}

type NodeKey = (InstPath, String);

/// Result of elaborating a root component.
#[derive(Debug, Clone, Default)]
pub struct Elaboration {
    pub instances: Vec<HdlInstance>,
    pub nets: Vec<Net>,
    connections: HashMap<NodeKey, String>,
    pub packages: Vec<String>,
    pub sources: Vec<String>,
    pub incdirs: Vec<String>,
    pub defines: Vec<String>,
}

impl Elaboration {
    /// Net connected to `port` of the instance at `path`, if any.
    pub fn connection(&self, path: &InstPath, port: &str) -> Option<&str> {
        self.connections
            .get(&(path.clone(), port.to_string()))
            .map(String::as_str)
    }

    /// Transactor instances in depth-first order.
    pub fn transactors(&self) -> impl Iterator<Item = &HdlInstance> {
        self.instances.iter().filter(|i| i.is_transactor())
    }
}

/// Directory holding `source`; `.` for a bare file name.
fn source_dir(source: &str) -> String {
    match Path::new(source).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    }
}

/// Elaborate the hardware part of `root`.
pub fn elaborate(root: &ComponentType) -> Result<Elaboration> {
    let mut builder = Builder::default();
    builder.walk(root, &InstPath::root(), true)?;
    let elab = builder.finish();
    debug!(
        root = %root.name,
        instances = elab.instances.len(),
        nets = elab.nets.len(),
        sources = elab.sources.len(),
        "elaborated hardware"
    );
    Ok(elab)
}

#[derive(Default)]
struct Builder {
    instances: Vec<HdlInstance>,
    nodes: Vec<NodeKey>,
    index: HashMap<NodeKey, usize>,
    parent: Vec<usize>,
    packages: OrderedSet,
    sources: OrderedSet,
    incdirs: OrderedSet,
    defines: OrderedSet,
}

impl Builder {
    fn walk(&mut self, scope: &ComponentType, path: &InstPath, is_root: bool) -> Result<()> {
        for child in &scope.children {
            for seg in child.elements() {
                let child_path = path.child(seg);
                let ty = &child.component;
                match ty.role {
                    Role::Plain => {}
                    Role::Transactor => self.add_instance(child_path, ty),
                    Role::Extern if ty.has_sources() => self.add_instance(child_path, ty),
                    Role::Extern if ty.is_leaf() => {
                        return Err(GenError::MissingFileset {
                            path: child_path.to_string(),
                        });
                    }
                    Role::Extern => self.walk(ty, &child_path, false)?,
                }
            }
        }
        for binding in &scope.bindings {
            self.bind(scope, path, is_root, binding);
        }
        Ok(())
    }

    fn add_instance(&mut self, path: InstPath, ty: &Arc<ComponentType>) {
        if let Some(fs) = &ty.fileset {
            self.packages.extend(fs.resolved_packages());
            self.incdirs.extend(fs.resolved_incdirs());
            self.defines.extend(fs.defines.iter().cloned());
            match ty.role {
                Role::Extern => self.sources.extend(fs.resolved_sources()),
                // Transactor sources are `include'd by file name from the generated module.
                Role::Transactor => {
                    self.incdirs.extend(fs.resolved_sources().iter().map(|src| source_dir(src)));
                }
                Role::Plain => {}
            }
        }
        self.instances.push(HdlInstance {
            path,
            component: Arc::clone(ty),
        });
    }

    /// Key of a binding endpoint, or `None` when it is outside the hardware domain.
    fn endpoint(scope: &ComponentType, path: &InstPath, is_root: bool, port: &PortRef) -> Option<NodeKey> {
        if port.is_self() {
            // `<Root>_hdl` has no ports of its own.
            return (!is_root).then(|| (path.clone(), port.port.clone()));
        }
        let mut current = scope;
        for seg in port.instance.segments() {
            let child = current.child(&seg.name)?;
            if child.component.role == Role::Plain {
                return None;
            }
            current = &child.component;
        }
        Some((path.join(&port.instance), port.port.clone()))
    }

    fn bind(&mut self, scope: &ComponentType, path: &InstPath, is_root: bool, binding: &Binding) {
        let left = Self::endpoint(scope, path, is_root, &binding.left);
        let right = Self::endpoint(scope, path, is_root, &binding.right);
        if let (Some(l), Some(r)) = (left, right) {
            let a = self.node(l);
            let b = self.node(r);
            self.union(a, b);
        }
    }

    fn node(&mut self, key: NodeKey) -> usize {
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(key.clone());
        self.index.insert(key, i);
        self.parent.push(i);
        i
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the earliest node as the representative.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }

    fn finish(mut self) -> Elaboration {
        let by_path: HashMap<InstPath, usize> = self
            .instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (inst.path.clone(), i))
            .collect();

        // Group real instance ports by representative, in first-seen order.
        let mut order: Vec<usize> = Vec::new();
        let mut groups: HashMap<usize, Vec<(NodeKey, Signal)>> = HashMap::new();
        for i in 0..self.nodes.len() {
            let root = self.find(i);
            let key = self.nodes[i].clone();
            let signal = by_path
                .get(&key.0)
                .and_then(|&inst| self.instances[inst].component.port(&key.1))
                .map(|p| p.signal);
            let members = groups.entry(root).or_insert_with(|| {
                order.push(root);
                Vec::new()
            });
            if let Some(signal) = signal {
                members.push((key, signal));
            }
        }

        let mut nets = Vec::new();
        let mut connections = HashMap::new();
        for root in order {
            let members = match groups.remove(&root) {
                Some(m) if !m.is_empty() => m,
                _ => continue,
            };
            let namer = members
                .iter()
                .find(|(_, s)| s.direction == Direction::Output)
                .or_else(|| members.iter().find(|(_, s)| s.direction == Direction::Inout))
                .unwrap_or(&members[0]);
            let name = format!("{}__{}", namer.0 .0.hdl_ident(), namer.0 .1);
            let width = members.iter().map(|(_, s)| s.width).max().unwrap_or(1);
            let kind = if members.iter().any(|(_, s)| s.direction == Direction::Inout) {
                NetKind::Wire
            } else {
                NetKind::Logic
            };
            for (key, _) in members {
                connections.insert(key, name.clone());
            }
            nets.push(Net { name, width, kind });
        }

        Elaboration {
            instances: self.instances,
            nets,
            connections,
            packages: self.packages.into_vec(),
            sources: self.sources.into_vec(),
            incdirs: self.incdirs.into_vec(),
            defines: self.defines.into_vec(),
        }
    }
}
