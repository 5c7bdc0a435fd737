//! Testbench generation errors.

use hdlsim_check::Violation;
use hdlsim_core::ModelError;
use hdlsim_xtor::XtorError;
use thiserror::Error;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GenError {
    /// The hierarchy failed the domain checker.
    #[error("hierarchy has {} violation(s); first: {}", .0.len(), first(.0))]
    Violations(Vec<Violation>),

    /// A transactor's dual generation failed.
    #[error("transactor at {path}: {source}")]
    Transactor {
        path: String,
        #[source]
        source: XtorError,
    },

    /// Two distinct types map to the same hardware design unit name.
    #[error("hardware unit '{name}' would be emitted for both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// An Extern leaf has no source files.
    #[error("extern instance {path} has no source files")]
    MissingFileset { path: String },

    /// The build task was given a class name without a package qualifier.
    #[error("class name must be fully qualified (pkg.Type): {name}")]
    InvalidClassName { name: String },

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn first(violations: &[Violation]) -> String {
    violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Result type alias for generation.
pub type Result<T> = std::result::Result<T, GenError>;
