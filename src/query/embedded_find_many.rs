use bson::Bson;
use serde::de::DeserializeOwned;

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY, FromStore};
use super::util::{not_found, singular, store_failure};
use crate::errorz::Result;

/// Reads a parent document and maps out the elements of one array field.
pub struct EmbeddedFindMany<'c, D, T> {
    coll: &'c dyn Collection,
    field: &'c str,
    mapper: FromStore<D, T>,
    key: &'c str,
}

impl<D, T> Clone for EmbeddedFindMany<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for EmbeddedFindMany<'_, D, T> {}

impl<'c, D, T> EmbeddedFindMany<'c, D, T> {
    pub fn new(coll: &'c dyn Collection, field: &'c str, mapper: FromStore<D, T>) -> Self {
        Self { coll, field, mapper, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }
}

impl<D: DeserializeOwned, T> EmbeddedFindMany<'_, D, T> {
    pub fn exec(&self, id: impl Into<Bson>) -> Result<T> {
        let id = id.into();
        let name = singular(self.coll.name());
        let fail = |e: &dyn std::fmt::Display| store_failure(format!("failed to get {name}: {e}"));

        let filter = key_filter(self.key, id.clone());
        let Some(parent) = self.coll.find_one(&filter, None).map_err(|e| fail(&e))? else {
            return Err(not_found(format!(
                "field {} not found in {name} {}",
                self.field,
                Plain(&id)
            )));
        };
        let record: D = bson::from_document(parent).map_err(|e| fail(&e))?;
        Ok((self.mapper)(record))
    }
}
