//! Runtime errors.

use hdlsim_core::ModelError;
use hdlsim_xtor::XtorError;

/// Errors raised while binding or calling into the hardware domain.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No bridge object is registered for a transactor instance.
    #[error("no bridge object registered at {path}[{index}] (registered: {})", list(.available))]
    BindingNotFound {
        path: String,
        index: usize,
        available: Vec<String>,
    },

    /// A second registration for the same key.
    #[error("bridge object already registered at {path}[{index}]")]
    AlreadyRegistered { path: String, index: usize },

    /// The configuration entry point named a type the catalog does not have.
    #[error("unknown root type: {name}")]
    UnknownRoot { name: String },

    /// A root was requested before the configuration entry point ran.
    #[error("no root type configured for this run")]
    NotConfigured,

    /// A root other than the configured one was requested.
    #[error("run is configured for {configured}, not {requested}")]
    RootMismatch { configured: String, requested: String },

    /// The hardware side of a channel has gone away.
    #[error("transactor at {path} is detached from the simulation")]
    Detached { path: String },

    #[error(transparent)]
    Xtor(#[from] XtorError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

fn list(paths: &[String]) -> String {
    if paths.is_empty() {
        "none".to_string()
    } else {
        paths.join(", ")
    }
}

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
