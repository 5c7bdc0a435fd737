//! Model error types.

use std::path::PathBuf;

/// Errors raised while building or resolving a component hierarchy.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A data type string could not be parsed.
    #[error("invalid data type '{text}': {detail}")]
    InvalidDataType { text: String, detail: String },

    /// A port reference string could not be parsed.
    #[error("invalid port reference '{text}': {detail}")]
    InvalidPortRef { text: String, detail: String },

    /// A path names a child instance that does not exist.
    #[error("no instance '{segment}' in component {component}")]
    UnknownInstance { component: String, segment: String },

    /// An array element index is past the declared array size.
    #[error("index {index} out of range for '{segment}' (count {count})")]
    IndexOutOfRange {
        segment: String,
        index: usize,
        count: usize,
    },

    /// An array instance was referenced without an element index.
    #[error("array instance '{segment}' referenced without an index")]
    MissingIndex { segment: String },

    /// A scalar instance was referenced with an element index.
    #[error("instance '{segment}' is not an array")]
    UnexpectedIndex { segment: String },

    /// A catalog references a component type it does not declare.
    #[error("unknown component type: {name}")]
    UnknownType { name: String },

    /// The same component type is declared twice.
    #[error("duplicate component type: {name}")]
    DuplicateType { name: String },

    /// A component type contains itself.
    #[error("recursive component type: {chain}")]
    RecursiveType { chain: String },

    /// Catalog file not found.
    #[error("catalog not found: {path}")]
    CatalogNotFound { path: PathBuf },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
