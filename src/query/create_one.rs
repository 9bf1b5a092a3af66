use serde::Serialize;

use super::types::{Collection, ToStore};
use super::util::{singular, store_failure};
use crate::errorz::Result;

/// Inserts one mapped domain value.
pub struct CreateOne<'c, D, T> {
    coll: &'c dyn Collection,
    mapper: ToStore<T, D>,
}

impl<D, T> Clone for CreateOne<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for CreateOne<'_, D, T> {}

impl<'c, D, T> CreateOne<'c, D, T> {
    pub fn new(coll: &'c dyn Collection, mapper: ToStore<T, D>) -> Self {
        Self { coll, mapper }
    }
}

impl<D: Serialize, T> CreateOne<'_, D, T> {
    /// Any encoding or driver failure is a Store error; duplicates are not
    /// told apart.
    pub fn exec(&self, value: &T) -> Result<()> {
        let fail = |e: &dyn std::fmt::Display| {
            store_failure(format!("failed to create {}: {e}", singular(self.coll.name())))
        };
        let document = bson::to_document(&(self.mapper)(value)).map_err(|e| fail(&e))?;
        self.coll.insert_one(document).map_err(|e| fail(&e))
    }
}
