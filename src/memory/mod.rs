//! An in-process [`Collection`] over a vector of documents.
//!
//! Filters, updates and projections are evaluated here with the same shapes
//! the query layer sends to a real store, which makes the query layer usable
//! in tests and small tools without a server.
//!
//! Numbers compare by value across BSON numeric types, and a missing field
//! equals `null`.
mod cursor;
mod eval;
mod update;

pub use cursor::MemoryCursor;

use bson::Document;
use parking_lot::RwLock;

use crate::errors::DbError;
use crate::query::{Collection, DeleteReport, DocumentCursor, UpdateReport};

const LOG_TARGET: &str = "powermesh::memory";

pub struct MemoryCollection {
    name: String,
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_documents(name, Vec::new())
    }

    pub fn with_documents(name: impl Into<String>, docs: Vec<Document>) -> Self {
        Self { name: name.into(), docs: RwLock::new(docs) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// A snapshot of the stored documents in insertion order.
    #[must_use]
    pub fn documents(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    fn position(docs: &[Document], filter: &Document) -> Result<Option<usize>, DbError> {
        for (i, d) in docs.iter().enumerate() {
            if eval::matches(d, filter)? {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    fn shape(
        doc: &Document,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Document, DbError> {
        match projection {
            Some(p) => eval::project(doc, p, filter),
            None => Ok(doc.clone()),
        }
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert_one(&self, document: Document) -> Result<(), DbError> {
        self.docs.write().push(document);
        log::trace!(target: LOG_TARGET, "insert_one into {}", self.name);
        Ok(())
    }

    fn update_one(&self, filter: &Document, update: &Document) -> Result<UpdateReport, DbError> {
        let mut docs = self.docs.write();
        let Some(i) = Self::position(&docs, filter)? else {
            log::trace!(target: LOG_TARGET, "update_one on {}: no match for {filter}", self.name);
            return Ok(UpdateReport::default());
        };
        let (next, changed) = update::apply_update(&docs[i], filter, update)?;
        if changed {
            docs[i] = next;
        }
        log::trace!(target: LOG_TARGET, "update_one on {}: modified={changed}", self.name);
        Ok(UpdateReport { matched: 1, modified: u64::from(changed) })
    }

    fn delete_one(&self, filter: &Document) -> Result<DeleteReport, DbError> {
        let mut docs = self.docs.write();
        let deleted = match Self::position(&docs, filter)? {
            Some(i) => {
                docs.remove(i);
                1
            }
            None => 0,
        };
        log::trace!(target: LOG_TARGET, "delete_one on {}: deleted={deleted}", self.name);
        Ok(DeleteReport { deleted })
    }

    fn delete_many(&self, filter: &Document) -> Result<DeleteReport, DbError> {
        let mut docs = self.docs.write();
        let hits = docs.iter().map(|d| eval::matches(d, filter)).collect::<Result<Vec<_>, _>>()?;
        let before = docs.len();
        let mut hits = hits.into_iter();
        docs.retain(|_| !hits.next().unwrap_or(false));
        let deleted = (before - docs.len()) as u64;
        log::trace!(target: LOG_TARGET, "delete_many on {}: deleted={deleted}", self.name);
        Ok(DeleteReport { deleted })
    }

    fn find_one(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, DbError> {
        let docs = self.docs.read();
        let found = match Self::position(&docs, filter)? {
            Some(i) => Some(Self::shape(&docs[i], filter, projection)?),
            None => None,
        };
        log::trace!(target: LOG_TARGET, "find_one on {}: found={}", self.name, found.is_some());
        Ok(found)
    }

    fn find(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Box<dyn DocumentCursor>, DbError> {
        let docs = self.docs.read();
        let mut out = Vec::new();
        for d in docs.iter() {
            if eval::matches(d, filter)? {
                out.push(Self::shape(d, filter, projection)?);
            }
        }
        log::trace!(target: LOG_TARGET, "find on {}: {} documents", self.name, out.len());
        Ok(Box::new(MemoryCursor::new(out)))
    }

    fn count_documents(&self, filter: &Document) -> Result<u64, DbError> {
        let docs = self.docs.read();
        let mut n = 0u64;
        for d in docs.iter() {
            if eval::matches(d, filter)? {
                n += 1;
            }
        }
        Ok(n)
    }
}
