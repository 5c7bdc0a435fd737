//! Host runtime for hdlsim testbenches.
//!
//! At run time the hardware side registers one bridge object per
//! transactor instance; the host side then rebuilds the component tree as
//! [`RuntimeProxy`] objects whose transactor leaves are bound to those
//! registered objects.
//!
//! ## Modules
//!
//! - [`registry`]: write-once bridge registration table
//! - [`channel`]: blocking request/acknowledge channel between domains
//! - [`proxy`]: runtime proxies and bound transactor handles
//! - [`factory`]: proxy tree construction
//! - [`context`]: run-scoped state and the host configuration entry point

pub mod channel;
pub mod context;
pub mod error;
pub mod factory;
pub mod proxy;
pub mod registry;

// Re-export key types for convenience
pub use channel::{HardwareEndpoint, HostEndpoint, Request, XtorChannel};
pub use context::RuntimeContext;
pub use error::RuntimeError;
pub use factory::HostFactory;
pub use proxy::{ProxyChild, RuntimeProxy, XtorHandle};
pub use registry::{BridgeObject, BridgeRegistry};
