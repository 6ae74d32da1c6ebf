use serde::Serialize;
use thiserror::Error;

/// Why a list entry could not be given an address of its own.
///
/// These never abort a tree build. The affected member is emitted without an
/// address of its own and the error attached.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyResolutionError {
    #[error("key field '{field}' holds a mapping or sequence")]
    NonScalarKey { field: String },

    #[error("key field '{field}' is null")]
    NullKey { field: String },

    #[error("list entry has no fields")]
    EmptyEntry,

    #[error("list member is not a mapping")]
    NotAnEntry,

    #[error("duplicate key value '{key}'")]
    DuplicateKey { key: String },
}

/// Errors from building a tree out of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("configuration document must be a mapping, found {found}")]
    NotAMapping { found: &'static str },
}
