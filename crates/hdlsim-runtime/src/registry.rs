//! Bridge registration table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{Result, RuntimeError};

/// A hardware-side object the host can call through.
///
/// `method_id` is the protocol index of the method; arguments and the
/// result travel as 64-bit slots.
pub trait BridgeObject: Send + Sync {
    fn invoke(&self, method_id: u32, args: &[u64]) -> Result<u64>;
}

impl<F> BridgeObject for F
where
    F: Fn(u32, &[u64]) -> Result<u64> + Send + Sync,
{
    fn invoke(&self, method_id: u32, args: &[u64]) -> Result<u64> {
        self(method_id, args)
    }
}

type Key = (String, usize);

/// Shared table of registered bridge objects keyed by `(path, index)`.
///
/// Each key is written at most once; lookups never register.
#[derive(Default)]
pub struct BridgeRegistry {
    handles: RwLock<BTreeMap<Key, Arc<dyn BridgeObject>>>,
}

impl fmt::Debug for BridgeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

fn display_key(path: &str, index: usize) -> String {
    if index == 0 {
        path.to_string()
    } else {
        format!("{path}[{index}]")
    }
}

impl BridgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `(path, index)`.
    pub fn register(&self, handle: Arc<dyn BridgeObject>, path: &str, index: usize) -> Result<()> {
        let mut handles = self.handles.write().unwrap_or_else(PoisonError::into_inner);
        let key = (path.to_string(), index);
        if handles.contains_key(&key) {
            return Err(RuntimeError::AlreadyRegistered {
                path: path.to_string(),
                index,
            });
        }
        handles.insert(key, handle);
        debug!(path, index, "registered bridge object");
        Ok(())
    }

    /// Look up the object registered under `(path, index)`.
    pub fn lookup(&self, path: &str, index: usize) -> Result<Arc<dyn BridgeObject>> {
        let handles = self.handles.read().unwrap_or_else(PoisonError::into_inner);
        handles
            .get(&(path.to_string(), index))
            .cloned()
            .ok_or_else(|| RuntimeError::BindingNotFound {
                path: path.to_string(),
                index,
                available: handles.keys().map(|(p, i)| display_key(p, *i)).collect(),
            })
    }

    /// Registered keys, sorted; array elements past 0 carry `[index]`.
    pub fn paths(&self) -> Vec<String> {
        let handles = self.handles.read().unwrap_or_else(PoisonError::into_inner);
        handles.keys().map(|(p, i)| display_key(p, *i)).collect()
    }

    pub fn len(&self) -> usize {
        self.handles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> Arc<dyn BridgeObject> {
        Arc::new(|_: u32, args: &[u64]| -> Result<u64> { Ok(args.first().copied().unwrap_or(0)) })
    }

    #[test]
    fn register_then_lookup() {
        let reg = BridgeRegistry::new();
        let handle = echo();
        reg.register(Arc::clone(&handle), "top.xtor", 0).unwrap();
        let found = reg.lookup("top.xtor", 0).unwrap();
        assert!(Arc::ptr_eq(&found, &handle));
        assert_eq!(found.invoke(0, &[7]).unwrap(), 7);
    }

    #[test]
    fn write_once() {
        let reg = BridgeRegistry::new();
        reg.register(echo(), "top.xtor", 0).unwrap();
        assert!(matches!(
            reg.register(echo(), "top.xtor", 0),
            Err(RuntimeError::AlreadyRegistered { .. })
        ));
        reg.register(echo(), "top.xtor", 1).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn missing_lists_available() {
        let reg = BridgeRegistry::new();
        reg.register(echo(), "top.a", 0).unwrap();
        reg.register(echo(), "top.b", 2).unwrap();
        match reg.lookup("top.c", 0) {
            Err(RuntimeError::BindingNotFound { path, available, .. }) => {
                assert_eq!(path, "top.c");
                assert_eq!(available, vec!["top.a", "top.b[2]"]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("lookup should fail"),
        }
    }
}
