//! Names of the bridge entry points called from the generated wrapper.

use serde::{Deserialize, Serialize};

/// Identifiers the top wrapper uses to reach the cross-domain bridge.
///
/// Defaults match the pyhdl-if bridge; a project manifest may override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeNames {
    /// Package imported into the wrapper.
    pub package: String,
    /// Task that starts the bridge.
    pub start: String,
    /// Registration primitive: `register(handle, path, index)`.
    pub register: String,
    /// Host configuration entry point, called with the qualified root name.
    pub configure: String,
    /// Task that runs the host process and blocks until it completes.
    pub run: String,
    /// Argument passed to `run`.
    pub run_arg: String,
}

impl Default for BridgeNames {
    fn default() -> Self {
        BridgeNames {
            package: "pyhdl_if".into(),
            start: "pyhdl_if_start".into(),
            register: "pyhdl_if_registerObject".into(),
            configure: "hdlsim_configure".into(),
            run: "pyhdl_pytest".into(),
            run_arg: ".".into(),
        }
    }
}
