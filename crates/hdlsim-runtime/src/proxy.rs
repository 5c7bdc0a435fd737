//! Host-side mirrors of component instances.

use std::fmt;
use std::sync::Arc;

use hdlsim_core::{Protocol, Role};
use hdlsim_xtor::marshal::{decode, encode_args};
use hdlsim_xtor::{Value, XtorError};
use tracing::trace;

use crate::error::Result;
use crate::registry::BridgeObject;

/// A transactor proxy's binding to its registered bridge object.
#[derive(Clone)]
pub struct XtorHandle {
    type_name: String,
    protocol: Protocol,
    object: Arc<dyn BridgeObject>,
}

impl fmt::Debug for XtorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XtorHandle")
            .field("type_name", &self.type_name)
            .field("methods", &self.protocol.methods.len())
            .finish()
    }
}

impl XtorHandle {
    pub fn new(type_name: impl Into<String>, protocol: Protocol, object: Arc<dyn BridgeObject>) -> Self {
        XtorHandle {
            type_name: type_name.into(),
            protocol,
            object,
        }
    }

    /// The registered object this handle calls through.
    pub fn object(&self) -> &Arc<dyn BridgeObject> {
        &self.object
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Call a protocol method by name. Blocks until the hardware side
    /// acknowledges.
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let (id, sig) = self
            .protocol
            .method(method)
            .ok_or_else(|| XtorError::UnknownMethod {
                transactor: self.type_name.clone(),
                method: method.to_string(),
            })?;
        let slots = encode_args(sig, args)?;
        let method_id = u32::try_from(id).map_err(|_| XtorError::UnknownMethod {
            transactor: self.type_name.clone(),
            method: method.to_string(),
        })?;
        trace!(transactor = %self.type_name, method, "call");
        let result = self.object.invoke(method_id, &slots)?;
        Ok(decode(&sig.returns, result)?)
    }
}

/// A child slot of a proxy: one instance or an array of them.
#[derive(Debug, Clone)]
pub enum ProxyChild {
    Single(RuntimeProxy),
    Array(Vec<RuntimeProxy>),
}

/// Host-side mirror of one component instance.
#[derive(Debug, Clone)]
pub struct RuntimeProxy {
    pub(crate) inst_path: String,
    pub(crate) index: Option<usize>,
    pub(crate) type_name: String,
    pub(crate) role: Role,
    pub(crate) children: Vec<(String, ProxyChild)>,
    pub(crate) binding: Option<XtorHandle>,
}

impl RuntimeProxy {
    /// Instance path; array elements share their array's path.
    pub fn inst_path(&self) -> &str {
        &self.inst_path
    }

    /// Element index within an array, `None` for scalar instances.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn children(&self) -> &[(String, ProxyChild)] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&ProxyChild> {
        self.children.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Scalar child by name.
    pub fn get(&self, name: &str) -> Option<&RuntimeProxy> {
        match self.child(name)? {
            ProxyChild::Single(p) => Some(p),
            ProxyChild::Array(_) => None,
        }
    }

    /// Array element by name and index.
    pub fn element(&self, name: &str, index: usize) -> Option<&RuntimeProxy> {
        match self.child(name)? {
            ProxyChild::Array(items) => items.get(index),
            ProxyChild::Single(_) => None,
        }
    }

    /// The bound bridge handle, for transactor proxies.
    pub fn handle(&self) -> Option<&XtorHandle> {
        self.binding.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Visit this proxy and every descendant, depth-first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RuntimeProxy)) {
        visit(self);
        for (_, child) in &self.children {
            match child {
                ProxyChild::Single(p) => p.walk(visit),
                ProxyChild::Array(items) => {
                    for p in items {
                        p.walk(visit);
                    }
                }
            }
        }
    }
}
