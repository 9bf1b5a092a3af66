use bson::Document;

use crate::errors::DbError;

/// Key field used when a query is not told otherwise.
pub const DEFAULT_KEY: &str = "id";

/// Maps a domain value to its store record.
pub type ToStore<T, D> = fn(&T) -> D;

/// Maps a store record back to its domain value.
pub type FromStore<D, T> = fn(D) -> T;

/// Outcome of a single-document update.
///
/// `matched` counts documents selected by the filter, `modified` those the
/// update actually changed. Embedded writes interpret them in that order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: u64,
}

/// A multi-result read handle. Must be closed once consumed.
pub trait DocumentCursor {
    /// Reads every remaining document.
    fn all(&mut self) -> Result<Vec<Document>, DbError>;

    fn close(&mut self) -> Result<(), DbError>;
}

/// The driver surface the query layer is written against.
///
/// Implementations own connection handling, deadlines and their own
/// synchronization; the query layer calls them from any thread.
pub trait Collection: Send + Sync {
    /// Plural collection name, used in error messages.
    fn name(&self) -> &str;

    fn insert_one(&self, document: Document) -> Result<(), DbError>;

    fn update_one(&self, filter: &Document, update: &Document) -> Result<UpdateReport, DbError>;

    fn delete_one(&self, filter: &Document) -> Result<DeleteReport, DbError>;

    fn delete_many(&self, filter: &Document) -> Result<DeleteReport, DbError>;

    /// Returns the first matching document, `None` when nothing matches.
    fn find_one(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, DbError>;

    fn find(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Box<dyn DocumentCursor>, DbError>;

    fn count_documents(&self, filter: &Document) -> Result<u64, DbError>;
}

pub(crate) fn resolve_key(key: &str) -> &str {
    if key.is_empty() { DEFAULT_KEY } else { key }
}
