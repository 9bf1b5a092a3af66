use super::filter::Selector;
use super::types::{Collection, DEFAULT_KEY};
use super::util::{not_found, singular, store_failure};
use crate::errorz::Result;

/// Deletes one document addressed by id or filter.
#[derive(Clone, Copy)]
pub struct DeleteOne<'c> {
    coll: &'c dyn Collection,
    key: &'c str,
}

impl<'c> DeleteOne<'c> {
    pub fn new(coll: &'c dyn Collection) -> Self {
        Self { coll, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }

    /// Nothing deleted is NotFound.
    pub fn exec(&self, selector: impl Into<Selector>) -> Result<()> {
        let selector = selector.into();
        let filter = selector.to_document(self.key);

        let report = self.coll.delete_one(&filter).map_err(|e| {
            store_failure(format!("failed to delete {}: {e}", singular(self.coll.name())))
        })?;
        if report.deleted == 0 {
            return Err(not_found(format!(
                "{} {selector} not found",
                singular(self.coll.name())
            )));
        }
        Ok(())
    }
}
