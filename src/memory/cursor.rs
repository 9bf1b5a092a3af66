use bson::Document;

use crate::errors::DbError;
use crate::query::DocumentCursor;

/// A cursor over documents materialized by a read.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    docs: Vec<Document>,
    pos: usize,
    closed: bool,
}

impl MemoryCursor {
    #[must_use]
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs, pos: 0, closed: false }
    }

    pub fn advance(&mut self) -> Option<Document> {
        if self.closed || self.pos >= self.docs.len() {
            return None;
        }
        let d = self.docs[self.pos].clone();
        self.pos += 1;
        Some(d)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Iterator for MemoryCursor {
    type Item = Document;
    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}

impl DocumentCursor for MemoryCursor {
    fn all(&mut self) -> Result<Vec<Document>, DbError> {
        if self.closed {
            return Err(DbError::CursorClosed);
        }
        Ok(self.by_ref().collect())
    }

    /// Closing twice is fine.
    fn close(&mut self) -> Result<(), DbError> {
        self.closed = true;
        Ok(())
    }
}
