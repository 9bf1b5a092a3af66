use bson::{Bson, Document, doc};

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY};
use super::util::{not_found, singular, store_failure};
use crate::errorz::Result;

/// Sets only the given fields of one document.
#[derive(Clone, Copy)]
pub struct MergeFields<'c> {
    coll: &'c dyn Collection,
    key: &'c str,
}

impl<'c> MergeFields<'c> {
    pub fn new(coll: &'c dyn Collection) -> Self {
        Self { coll, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }

    pub fn exec(&self, id: impl Into<Bson>, fields: Document) -> Result<()> {
        let id = id.into();
        let filter = key_filter(self.key, id.clone());
        let update = doc! { "$set": fields };

        let report = self.coll.update_one(&filter, &update).map_err(|e| {
            store_failure(format!("failed to update {}: {e}", singular(self.coll.name())))
        })?;
        if report.matched == 0 {
            return Err(not_found(format!(
                "{} {} not found",
                singular(self.coll.name()),
                Plain(&id)
            )));
        }
        Ok(())
    }
}
