use bson::{Bson, doc};
use serde::Serialize;

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY, ToStore};
use super::util::{not_found, singular, store_failure};
use crate::errorz::Result;

/// Replaces a whole document, addressed by its key field, with a mapped value.
pub struct UpdateOne<'c, D, T> {
    coll: &'c dyn Collection,
    mapper: ToStore<T, D>,
    key: &'c str,
}

impl<D, T> Clone for UpdateOne<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for UpdateOne<'_, D, T> {}

impl<'c, D, T> UpdateOne<'c, D, T> {
    pub fn new(coll: &'c dyn Collection, mapper: ToStore<T, D>) -> Self {
        Self { coll, mapper, key: DEFAULT_KEY }
    }

    /// Returns a copy addressing documents by `key` instead of `id`.
    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }
}

impl<D: Serialize, T> UpdateOne<'_, D, T> {
    pub fn exec(&self, id: impl Into<Bson>, value: &T) -> Result<()> {
        let id = id.into();
        let fail = |e: &dyn std::fmt::Display| {
            store_failure(format!("failed to update {}: {e}", singular(self.coll.name())))
        };
        let record = bson::to_document(&(self.mapper)(value)).map_err(|e| fail(&e))?;
        let filter = key_filter(self.key, id.clone());
        let update = doc! { "$set": record };

        let report = self.coll.update_one(&filter, &update).map_err(|e| fail(&e))?;
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
