//! Transactor dual generation for hdlsim.
//!
//! Each Transactor type yields two artifacts from one protocol description:
//! a SystemVerilog implementation (handshake interface, bridge wrapper
//! package and service module) and a JSON API manifest describing the
//! callable surface to the host domain.
//!
//! ## Modules
//!
//! - [`marshal`]: hardware representation of protocol types and 64-bit slot encoding
//! - [`hdl`]: SystemVerilog emission for the handshake and service loop
//! - [`manifest`]: API manifest document
//! - [`dual`]: the per-type generator tying the two together

pub mod dual;
pub mod error;
pub mod hdl;
pub mod manifest;
pub mod marshal;

// Re-export key types for convenience
pub use dual::{generate, TransactorDual};
pub use error::XtorError;
pub use manifest::{ApiManifest, ApiMethod, ApiParam, ApiPort, MethodKind};
pub use marshal::Value;
