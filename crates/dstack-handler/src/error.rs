use std::path::PathBuf;

/// Errors that can occur while encoding an object.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// No handler accepts objects of this type.
    #[error("unsupported object type {type_name} (handler: {handler})")]
    UnsupportedObjectType {
        type_name: &'static str,
        handler: &'static str,
    },

    /// A handler was asked to encode an object it did not declare capable.
    #[error("handler {0} cannot encode this object")]
    Mismatch(&'static str),

    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A structured object could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The object is malformed, e.g. a table row of the wrong width.
    #[error("invalid object: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, HandlerError>;
