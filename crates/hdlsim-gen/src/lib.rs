//! Testbench generation for hdlsim.
//!
//! Turns a checked component hierarchy into the hardware wiring module
//! `<Root>_hdl`, the top wrapper `<Root>` that bridges into the host
//! process, one transactor dual per Transactor type and a compile-ordered
//! fileset.
//!
//! ## Modules
//!
//! - [`elaborate`]: hardware instance collection and net construction
//! - [`hdl_module`]: `<Root>_hdl` emission
//! - [`wrapper`]: `<Root>` emission
//! - [`host_stub`]: host test entry stub
//! - [`fileset`]: compile-ordered fileset
//! - [`bridge`]: bridge entry-point names
//! - [`generator`]: the generation pipeline
//! - [`task`]: the `gen-tb` build task

pub mod bridge;
pub mod elaborate;
pub mod error;
pub mod fileset;
pub mod generator;
pub mod hdl_module;
pub mod host_stub;
pub mod task;
pub mod wrapper;

// Re-export key types for convenience
pub use bridge::BridgeNames;
pub use error::GenError;
pub use fileset::{FileEntry, FileGroup, FileRef, Fileset};
pub use generator::{generate, GenConfig, TestbenchGenerator, TestbenchOutput};
pub use task::{GenTbTask, TaskOutput};
