//! Run-scoped runtime state.
//!
//! A [`RuntimeContext`] owns the bridge registry and the catalog for one
//! simulation run. The generated wrapper calls [`RuntimeContext::configure`]
//! with the fully qualified root type before the host process starts; host
//! code then asks the context to construct that root.

use std::sync::{Arc, PoisonError, RwLock};

use hdlsim_core::{ComponentType, TypeCatalog};
use tracing::info;

use crate::error::{Result, RuntimeError};
use crate::factory::HostFactory;
use crate::proxy::RuntimeProxy;
use crate::registry::BridgeRegistry;

/// Instance path of the root proxy; matches the wrapper's top instance.
pub const ROOT_PATH: &str = "top";

#[derive(Debug)]
pub struct RuntimeContext {
    registry: Arc<BridgeRegistry>,
    catalog: TypeCatalog,
    root: RwLock<Option<Arc<ComponentType>>>,
}

impl RuntimeContext {
    pub fn new(catalog: TypeCatalog) -> Self {
        RuntimeContext {
            registry: Arc::new(BridgeRegistry::new()),
            catalog,
            root: RwLock::new(None),
        }
    }

    /// The registry the hardware side registers into.
    pub fn registry(&self) -> &Arc<BridgeRegistry> {
        &self.registry
    }

    /// Select the root type for this run.
    pub fn configure(&self, qualified_name: &str) -> Result<()> {
        if !self.catalog.contains(qualified_name) {
            return Err(RuntimeError::UnknownRoot {
                name: qualified_name.to_string(),
            });
        }
        let root = self.catalog.resolve(qualified_name)?;
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = Some(root);
        info!(root = qualified_name, "configured run");
        Ok(())
    }

    pub fn configured_root(&self) -> Option<Arc<ComponentType>> {
        self.root.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Build the proxy tree for `type_name`, which must be the configured root.
    pub fn construct(&self, type_name: &str) -> Result<RuntimeProxy> {
        let root = self.configured_root().ok_or(RuntimeError::NotConfigured)?;
        if root.name != type_name {
            return Err(RuntimeError::RootMismatch {
                configured: root.name.clone(),
                requested: type_name.to_string(),
            });
        }
        self.factory().create(&root, ROOT_PATH)
    }

    pub fn factory(&self) -> HostFactory<'_> {
        HostFactory::new(&self.registry)
    }
}
