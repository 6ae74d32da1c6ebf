use confpath::v1::TreeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("HTTP {status}")]
    Network { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid JSON: {0}")]
    Parse(serde_json::Error),

    #[error("notification stream error: {0}")]
    Stream(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("no node at path: {0}")]
    UnknownPath(String),

    #[error("node at '{path}' cannot be selected: {reason}")]
    NotAddressable { path: String, reason: String },

    #[error("a save is already in progress")]
    SaveInProgress,

    #[error("no document is loaded for editing")]
    NotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
