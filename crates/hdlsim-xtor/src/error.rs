//! Transactor generation and marshaling errors.

/// Errors raised while generating a transactor or marshaling its calls.
#[derive(Debug, thiserror::Error)]
pub enum XtorError {
    /// A parameter or return type has no hardware representation.
    #[error("method '{method}' uses type '{ty}' which has no hardware representation")]
    UnsupportedSignature { method: String, ty: String },

    /// A method or parameter name cannot be used as a generated identifier.
    #[error("method '{method}': '{name}' is a keyword, a generated identifier or not a legal identifier")]
    ReservedName { method: String, name: String },

    /// A name is declared twice where generated code needs it unique.
    #[error("'{name}' is declared more than once in {scope}")]
    DuplicateName { scope: String, name: String },

    /// A non-blocking method declares a return value.
    #[error("non-blocking method '{method}' cannot return a value")]
    NonBlockingReturn { method: String },

    /// The component is not a Transactor.
    #[error("{name} is not a transactor")]
    NotATransactor { name: String },

    /// The Transactor declares no protocol.
    #[error("transactor {name} declares no protocol")]
    MissingProtocol { name: String },

    /// A call names a method the protocol does not declare.
    #[error("transactor {transactor} has no method '{method}'")]
    UnknownMethod { transactor: String, method: String },

    /// A call passes the wrong number of arguments.
    #[error("method '{method}' takes {expected} argument(s), got {found}")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    /// A value does not match the declared type.
    #[error("value {value} does not fit type '{ty}'")]
    TypeMismatch { ty: String, value: String },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for transactor operations.
pub type Result<T> = std::result::Result<T, XtorError>;
