//! Domain-separation checker for hdlsim component hierarchies.
//!
//! Walks a component tree and reports every binding that would carry a
//! signal across the hardware/host split without passing through a
//! transactor, together with the structural rules the generator relies on.
//!
//! ## Modules
//!
//! - [`violation`]: violation records and their kinds
//! - [`checker`]: the depth-first rule walker

pub mod checker;
pub mod violation;

// Re-export key types for convenience
pub use checker::{check, has_errors};
pub use violation::{Violation, ViolationKind};
