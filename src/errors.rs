use thiserror::Error;

/// Failures reported by a document-store driver.
///
/// The query layer never hands these to callers directly: every `DbError`
/// is classified into an [`crate::errorz::DomainError`] first.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("BSON encode: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("BSON decode: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Update error: {0}")]
    UpdateError(String),

    #[error("Cursor error: {0}")]
    CursorError(String),

    #[error("cursor already closed")]
    CursorClosed,
}
