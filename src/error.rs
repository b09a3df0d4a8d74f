//! Error types for the proto-tsjson-gen crate.

use std::path::PathBuf;

/// Errors that can occur during TypeScript type generation.
///
/// All generation errors are fatal: the run aborts without writing any
/// output, and re-running with unchanged input reproduces the same error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The schema model is structurally inconsistent (e.g., a map field
    /// carrying a `repeated` label, or a field naming an undeclared oneof).
    #[error("schema error: {0}")]
    Schema(String),

    /// A field references a qualified type name absent from the schema graph.
    #[error("unresolved type '{type_name}' referenced by {context}")]
    UnresolvedType { type_name: String, context: String },

    /// Two distinct declarations (or two JSON field keys within one message)
    /// resolve to the same emitted identifier.
    #[error("name collision: '{ident}' is produced by both {first} and {second}")]
    NameCollision {
        ident: String,
        first: String,
        second: String,
    },

    /// A map key type that cannot be represented as a JSON object key.
    #[error("map key type '{key}' of {context} is not representable as a JSON object key")]
    UnsupportedMapKey {
        key: &'static str,
        context: String,
    },

    /// Failed to write generated TypeScript files.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parse error with context.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
