use super::filter::Filter;
use super::types::Collection;
use super::util::{singular, store_failure};
use crate::errorz::Result;

/// Deletes every document matching a filter.
#[derive(Clone, Copy)]
pub struct DeleteMany<'c> {
    coll: &'c dyn Collection,
}

impl<'c> DeleteMany<'c> {
    pub fn new(coll: &'c dyn Collection) -> Self {
        Self { coll }
    }

    /// Returns the number of deleted documents. Matching nothing is not an
    /// error here.
    pub fn exec(&self, filter: &Filter) -> Result<u64> {
        let report = self.coll.delete_many(filter.as_document()).map_err(|e| {
            store_failure(format!("failed to delete {}: {e}", singular(self.coll.name())))
        })?;
        Ok(report.deleted)
    }
}
