//! Component hierarchy model for hdlsim.
//!
//! Describes a testbench as a tree of typed components that is later split
//! between a hardware-simulated domain and a host-process domain.
//!
//! ## Modules
//!
//! - [`types`]: roles, signal directions, and protocol data types
//! - [`path`]: instance paths and port references
//! - [`component`]: component descriptors, bindings, filesets, protocols
//! - [`catalog`]: TOML component catalogs resolved into descriptor trees
//! - [`artifact`]: immutable generated artifacts
//! - [`hash`]: content hashing for reproducible outputs

pub mod artifact;
pub mod catalog;
pub mod component;
pub mod error;
pub mod hash;
pub mod path;
pub mod types;

// Re-export key types for convenience
pub use artifact::{ArtifactKind, GeneratedArtifact};
pub use catalog::TypeCatalog;
pub use component::{Binding, ChildInstance, ComponentType, MethodSig, Param, Port, Protocol, SourceFileset};
pub use error::ModelError;
pub use path::{InstPath, PathSegment, PortRef};
pub use types::{DataType, Direction, Domain, Role, Signal};
