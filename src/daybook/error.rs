use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DaybookError {
    /// The journal file could not be read as text.
    #[error("Unable to read journal: {0}")]
    Parse(String),

    /// A date or duration string that none of the supported forms accept.
    #[error("Invalid time expression: {0:?}")]
    InvalidTimeExpression(String),

    /// A stale item reference was passed to update/delete. Callers must
    /// hold ids handed out by the store, not copies of old state.
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("No section matching {0:?}")]
    InvalidSection(String),

    #[error("No view named {0:?}")]
    InvalidView(String),

    /// No usable content after stripping comments and blank lines.
    #[error("No content provided")]
    EmptyInput,

    #[error("Editor failed: {0}")]
    Editor(String),

    /// Internal invariant violation.
    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DaybookError>;
