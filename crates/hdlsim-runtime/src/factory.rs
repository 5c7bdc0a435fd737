//! Proxy tree construction.
//!
//! The factory mirrors the component tree the hardware side was generated
//! from. Transactor nodes bind to the bridge object registered at their
//! path and index. Extern composites without sources were flattened into
//! the wiring module, so their children are mirrored too; other Extern
//! nodes and Transactors are leaves on the host side.
//!
//! Lookup keys come from [`InstPath::registry_key`] under the same prefix
//! the top wrapper registers with, so indexes of enclosing arrays stay in
//! the path and only the innermost index selects the registry slot.

use hdlsim_core::{ComponentType, InstPath, PathSegment, Role};
use tracing::debug;

use crate::error::Result;
use crate::proxy::{ProxyChild, RuntimeProxy, XtorHandle};
use crate::registry::BridgeRegistry;

/// Builds [`RuntimeProxy`] trees against a registry. Never registers.
#[derive(Debug, Clone, Copy)]
pub struct HostFactory<'a> {
    registry: &'a BridgeRegistry,
}

impl<'a> HostFactory<'a> {
    pub fn new(registry: &'a BridgeRegistry) -> Self {
        HostFactory { registry }
    }

    /// Build the proxy tree for `ty` rooted at `inst_path`.
    pub fn create(&self, ty: &ComponentType, inst_path: &str) -> Result<RuntimeProxy> {
        let proxy = self.build(ty, &InstPath::root(), inst_path)?;
        debug!(root = %ty.name, path = inst_path, "created proxy tree");
        Ok(proxy)
    }

    fn build(&self, ty: &ComponentType, path: &InstPath, prefix: &str) -> Result<RuntimeProxy> {
        let (key, slot) = path.registry_key(prefix);
        let mut proxy = RuntimeProxy {
            inst_path: key,
            index: path.last().and_then(|seg| seg.index),
            type_name: ty.name.clone(),
            role: ty.role,
            children: Vec::new(),
            binding: None,
        };

        let descend = match ty.role {
            Role::Transactor => {
                let object = self.registry.lookup(&proxy.inst_path, slot)?;
                proxy.binding = Some(XtorHandle::new(
                    ty.name.clone(),
                    ty.protocol.clone().unwrap_or_default(),
                    object,
                ));
                false
            }
            Role::Extern => !ty.has_sources(),
            Role::Plain => true,
        };

        if descend {
            for child in &ty.children {
                let entry = match child.count {
                    Some(n) => ProxyChild::Array(
                        (0..n)
                            .map(|i| {
                                let element = path.child(PathSegment::indexed(child.name.clone(), i));
                                self.build(&child.component, &element, prefix)
                            })
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    None => {
                        let single = path.child(PathSegment::new(child.name.clone()));
                        ProxyChild::Single(self.build(&child.component, &single, prefix)?)
                    }
                };
                proxy.children.push((child.name.clone(), entry));
            }
        }
        Ok(proxy)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use hdlsim_core::{ArtifactKind, DataType, Direction, MethodSig, Protocol, SourceFileset};
    use hdlsim_xtor::{Value, XtorError};

    use super::*;
    use crate::channel::XtorChannel;
    use crate::context::ROOT_PATH;
    use crate::error::RuntimeError;
    use crate::registry::BridgeObject;

    fn mem_xtor() -> Arc<ComponentType> {
        Arc::new(
            ComponentType::transactor(
                "tb.MemXtor",
                Protocol::new(vec![
                    MethodSig::new("write").param("addr", DataType::u32()).param("data", DataType::u32()),
                    MethodSig::new("read").param("addr", DataType::u32()).returns(DataType::Int(8)),
                ]),
            )
            .with_port("clock", Direction::Output, 1),
        )
    }

    fn dut() -> Arc<ComponentType> {
        Arc::new(
            ComponentType::extern_module("tb.Dut").with_fileset(SourceFileset::with_sources(["dut.sv"])),
        )
    }

    fn noop() -> Arc<dyn BridgeObject> {
        Arc::new(|_: u32, _: &[u64]| -> crate::error::Result<u64> { Ok(0) })
    }

    #[test]
    fn binds_after_registration() {
        let root = ComponentType::plain("tb.Top")
            .with_child("dut", dut())
            .with_child("xtor", mem_xtor());
        let registry = BridgeRegistry::new();
        let factory = HostFactory::new(&registry);

        match factory.create(&root, "top") {
            Err(RuntimeError::BindingNotFound { path, .. }) => assert_eq!(path, "top.xtor"),
            other => panic!("expected BindingNotFound, got {other:?}"),
        }

        let handle = noop();
        registry.register(Arc::clone(&handle), "top.xtor", 0).unwrap();
        let proxy = factory.create(&root, "top").unwrap();

        let xtor = proxy.get("xtor").unwrap();
        assert_eq!(xtor.inst_path(), "top.xtor");
        assert!(Arc::ptr_eq(xtor.handle().unwrap().object(), &handle));

        let dut = proxy.get("dut").unwrap();
        assert_eq!(dut.role(), Role::Extern);
        assert!(!dut.is_bound());
        assert!(!proxy.is_bound());
    }

    #[test]
    fn arrays_share_path_and_use_index() {
        let env = Arc::new(ComponentType::extern_module("tb.Env").with_array("xtors", mem_xtor(), 2));
        let root = ComponentType::plain("tb.Top").with_child("env", env);
        let registry = BridgeRegistry::new();
        let first = noop();
        let second = noop();
        registry.register(Arc::clone(&first), "top.env.xtors", 0).unwrap();
        registry.register(Arc::clone(&second), "top.env.xtors", 1).unwrap();

        let proxy = HostFactory::new(&registry).create(&root, "top").unwrap();
        let env = proxy.get("env").unwrap();
        let x1 = env.element("xtors", 1).unwrap();
        assert_eq!(x1.inst_path(), "top.env.xtors");
        assert_eq!(x1.index(), Some(1));
        assert!(Arc::ptr_eq(x1.handle().unwrap().object(), &second));
        assert!(env.get("xtors").is_none());

        let mut bound = 0;
        proxy.walk(&mut |p| {
            if p.is_bound() {
                bound += 1;
            }
        });
        assert_eq!(bound, 2);
        assert_eq!(registry.len(), 2);
    }

    fn env_array_root() -> ComponentType {
        let env = Arc::new(ComponentType::extern_module("tb.Env").with_child("xtor", mem_xtor()));
        ComponentType::plain("tb.Top")
            .with_child("dut", dut())
            .with_array("envs", env, 2)
    }

    #[test]
    fn enclosing_array_index_stays_in_path() {
        let root = env_array_root();
        let registry = BridgeRegistry::new();
        let first = noop();
        let second = noop();
        registry.register(Arc::clone(&first), "top.envs[0].xtor", 0).unwrap();
        registry.register(Arc::clone(&second), "top.envs[1].xtor", 0).unwrap();

        let proxy = HostFactory::new(&registry).create(&root, "top").unwrap();
        let env1 = proxy.element("envs", 1).unwrap();
        assert_eq!(env1.inst_path(), "top.envs");
        assert_eq!(env1.index(), Some(1));
        let x1 = env1.get("xtor").unwrap();
        assert_eq!(x1.inst_path(), "top.envs[1].xtor");
        assert_eq!(x1.index(), None);
        assert!(Arc::ptr_eq(x1.handle().unwrap().object(), &second));
        let x0 = proxy.element("envs", 0).unwrap().get("xtor").unwrap();
        assert!(Arc::ptr_eq(x0.handle().unwrap().object(), &first));
    }

    /// `(path, index)` pairs from the `registerObject` calls of a top wrapper.
    fn registrations(wrapper: &str) -> Vec<(String, usize)> {
        wrapper
            .lines()
            .filter(|line| line.contains("pyhdl_if_registerObject("))
            .map(|line| {
                let parts: Vec<&str> = line.split('"').collect();
                let index = parts[2].trim_start_matches(',').trim().trim_end_matches(");");
                (parts[1].to_string(), index.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn binds_every_key_the_wrapper_registers() {
        let root = env_array_root();
        let output = hdlsim_gen::TestbenchGenerator::default().generate(&root).unwrap();
        let wrapper = output
            .fileset
            .artifacts()
            .find(|a| a.kind() == ArtifactKind::WrapperModule)
            .unwrap();
        let keys = registrations(wrapper.content());
        assert_eq!(
            keys,
            vec![("top.envs[0].xtor".to_string(), 0), ("top.envs[1].xtor".to_string(), 0)]
        );

        let registry = BridgeRegistry::new();
        for (path, index) in &keys {
            registry.register(noop(), path, *index).unwrap();
        }
        let proxy = HostFactory::new(&registry).create(&root, ROOT_PATH).unwrap();
        let mut bound = 0;
        proxy.walk(&mut |p| {
            if p.is_bound() {
                bound += 1;
            }
        });
        assert_eq!(bound, keys.len());
    }

    #[test]
    fn calls_marshal_through_channel() {
        let root = ComponentType::plain("tb.Top").with_child("xtor", mem_xtor());
        let registry = BridgeRegistry::new();
        let (host, hw) = XtorChannel::open("top.xtor");
        registry.register(Arc::new(host), "top.xtor", 0).unwrap();

        let server = thread::spawn(move || {
            let mut memory = std::collections::HashMap::new();
            hw.serve(|req| match req.method_id {
                0 => {
                    memory.insert(req.args[0], req.args[1]);
                    0
                }
                _ => memory.get(&req.args[0]).copied().unwrap_or(0),
            });
        });

        let proxy = HostFactory::new(&registry).create(&root, "top").unwrap();
        let xtor = proxy.get("xtor").unwrap().handle().unwrap();
        assert_eq!(
            xtor.call("write", &[Value::UInt(4), Value::UInt(0xfe)]).unwrap(),
            Value::Unit
        );
        // 0xfe read back as i8
        assert_eq!(xtor.call("read", &[Value::UInt(4)]).unwrap(), Value::Int(-2));

        assert!(matches!(
            xtor.call("erase", &[]),
            Err(RuntimeError::Xtor(XtorError::UnknownMethod { .. }))
        ));
        assert!(matches!(
            xtor.call("read", &[]),
            Err(RuntimeError::Xtor(XtorError::ArityMismatch { .. }))
        ));

        drop(proxy);
        drop(registry);
        server.join().unwrap();
    }

    #[test]
    fn plain_nodes_need_no_registration() {
        let agent = Arc::new(ComponentType::plain("tb.Agent"));
        let root = ComponentType::plain("tb.Top").with_array("agents", agent, 3);
        let registry = BridgeRegistry::new();
        let proxy = HostFactory::new(&registry).create(&root, "top").unwrap();
        match proxy.child("agents") {
            Some(ProxyChild::Array(items)) => assert_eq!(items.len(), 3),
            other => panic!("expected array child, got {other:?}"),
        }
    }
}
