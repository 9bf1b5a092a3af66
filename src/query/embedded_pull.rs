use bson::{Bson, doc};

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY};
use super::util::{not_found, single, singular, store_failure};
use crate::errorz::Result;

/// Removes the array elements whose sub-key equals a given sub-id.
#[derive(Clone, Copy)]
pub struct EmbeddedPull<'c> {
    coll: &'c dyn Collection,
    field: &'c str,
    sub_key: &'c str,
    key: &'c str,
}

impl<'c> EmbeddedPull<'c> {
    pub fn new(coll: &'c dyn Collection, field: &'c str, sub_key: &'c str) -> Self {
        Self { coll, field, sub_key, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }

    /// A missing parent and a missing element are both NotFound, with
    /// different messages. The parent is checked first.
    pub fn exec(&self, id: impl Into<Bson>, sub_id: impl Into<Bson>) -> Result<()> {
        let (id, sub_id) = (id.into(), sub_id.into());
        let name = singular(self.coll.name());

        let filter = key_filter(self.key, id.clone());
        let update = doc! { "$pull": single(self.field, single(self.sub_key, sub_id.clone())) };

        let report = self
            .coll
            .update_one(&filter, &update)
            .map_err(|e| store_failure(format!("failed to pull {name}: {e}")))?;
        if report.matched == 0 {
            return Err(not_found(format!("{name} {} not found", Plain(&id))));
        }
        if report.modified == 0 {
            return Err(not_found(format!(
                "field {}[{}] not found in {name} {}",
                self.field,
                Plain(&sub_id),
                Plain(&id)
            )));
        }
        Ok(())
    }
}
