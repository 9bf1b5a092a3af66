use bson::{Bson, doc};
use serde::Serialize;

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY, ToStore};
use super::util::{not_found, single, singular, store_failure};
use crate::errorz::Result;

/// Appends a mapped value to an array field of one parent document.
pub struct EmbeddedPush<'c, D, T> {
    coll: &'c dyn Collection,
    field: &'c str,
    mapper: ToStore<T, D>,
    key: &'c str,
}

impl<D, T> Clone for EmbeddedPush<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for EmbeddedPush<'_, D, T> {}

impl<'c, D, T> EmbeddedPush<'c, D, T> {
    pub fn new(coll: &'c dyn Collection, field: &'c str, mapper: ToStore<T, D>) -> Self {
        Self { coll, field, mapper, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }
}

impl<D: Serialize, T> EmbeddedPush<'_, D, T> {
    /// Only the parent is checked; an append to a matched parent always lands.
    pub fn exec(&self, id: impl Into<Bson>, value: &T) -> Result<()> {
        let id = id.into();
        let fail = |e: &dyn std::fmt::Display| {
            store_failure(format!("failed to push {}: {e}", singular(self.coll.name())))
        };

        let element = bson::to_bson(&(self.mapper)(value)).map_err(|e| fail(&e))?;
        let filter = key_filter(self.key, id.clone());
        let update = doc! { "$push": single(self.field, element) };

        let report = self.coll.update_one(&filter, &update).map_err(|e| fail(&e))?;
        if report.matched == 0 {
            return Err(not_found(format!("{} {} not found", singular(self.coll.name()), Plain(&id))));
        }
        Ok(())
    }
}
