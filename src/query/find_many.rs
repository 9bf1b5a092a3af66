use bson::{Bson, Document};
use serde::de::DeserializeOwned;

use super::cursor::drain_cursor;
use super::filter::Filter;
use super::types::{Collection, FromStore};
use super::util::store_failure;
use crate::errorz::Result;

/// Reads every document matching a filter and maps each one.
pub struct FindMany<'c, D, T> {
    coll: &'c dyn Collection,
    mapper: FromStore<D, T>,
    projection: Vec<&'c str>,
}

impl<D, T> Clone for FindMany<'_, D, T> {
    fn clone(&self) -> Self {
        Self { coll: self.coll, mapper: self.mapper, projection: self.projection.clone() }
    }
}

impl<'c, D, T> FindMany<'c, D, T> {
    pub fn new(coll: &'c dyn Collection, mapper: FromStore<D, T>) -> Self {
        Self { coll, mapper, projection: Vec::new() }
    }

    /// Returns a copy that also restricts results to `fields`.
    #[must_use]
    pub fn with_projection(&self, fields: &[&'c str]) -> Self {
        let mut next = self.clone();
        next.projection.extend_from_slice(fields);
        next
    }

    fn projection_document(&self) -> Option<Document> {
        if self.projection.is_empty() {
            return None;
        }
        let mut d = Document::new();
        for field in &self.projection {
            d.insert(*field, Bson::Int32(1));
        }
        Some(d)
    }
}

impl<D: DeserializeOwned, T> FindMany<'_, D, T> {
    pub fn exec(&self, filter: &Filter) -> Result<Vec<T>> {
        let projection = self.projection_document();

        let mut cursor = self
            .coll
            .find(filter.as_document(), projection.as_ref())
            .map_err(|e| {
                store_failure(format!("failed to find many from {}: {e}", self.coll.name()))
            })?;
        let records: Vec<D> = drain_cursor(cursor.as_mut()).map_err(|e| {
            store_failure(format!("failed to drain many from {}: {e}", self.coll.name()))
        })?;

        Ok(records.into_iter().map(self.mapper).collect())
    }
}
