use serde::de::DeserializeOwned;

use super::filter::Selector;
use super::types::{Collection, DEFAULT_KEY, FromStore};
use super::util::{not_found, singular, store_failure};
use crate::errorz::Result;

/// Reads one document addressed by id or filter and maps it.
pub struct GetOne<'c, D, T> {
    coll: &'c dyn Collection,
    mapper: FromStore<D, T>,
    key: &'c str,
}

impl<D, T> Clone for GetOne<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for GetOne<'_, D, T> {}

impl<'c, D, T> GetOne<'c, D, T> {
    pub fn new(coll: &'c dyn Collection, mapper: FromStore<D, T>) -> Self {
        Self { coll, mapper, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }
}

impl<D: DeserializeOwned, T> GetOne<'_, D, T> {
    pub fn exec(&self, selector: impl Into<Selector>) -> Result<T> {
        let selector = selector.into();
        let filter = selector.to_document(self.key);
        let fail = |e: &dyn std::fmt::Display| {
            store_failure(format!("failed to get {}: {e}", singular(self.coll.name())))
        };

        let Some(document) = self.coll.find_one(&filter, None).map_err(|e| fail(&e))? else {
            return Err(not_found(format!(
                "{} {selector} not found",
                singular(self.coll.name())
            )));
        };
        let record: D = bson::from_document(document).map_err(|e| fail(&e))?;
        Ok((self.mapper)(record))
    }
}
