use bson::{Bson, doc};
use serde::Serialize;

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY, ToStore};
use super::util::{not_found, single, singular, store_failure};
use crate::errorz::Result;

/// Replaces one array element, addressed by its sub-key, in place.
pub struct EmbeddedUpdate<'c, D, T> {
    coll: &'c dyn Collection,
    field: &'c str,
    sub_key: &'c str,
    mapper: ToStore<T, D>,
    key: &'c str,
}

impl<D, T> Clone for EmbeddedUpdate<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for EmbeddedUpdate<'_, D, T> {}

impl<'c, D, T> EmbeddedUpdate<'c, D, T> {
    pub fn new(
        coll: &'c dyn Collection,
        field: &'c str,
        sub_key: &'c str,
        mapper: ToStore<T, D>,
    ) -> Self {
        Self { coll, field, sub_key, mapper, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }
}

impl<D: Serialize, T> EmbeddedUpdate<'_, D, T> {
    /// Writing a value equal to the stored element reports the element as
    /// not found, since nothing was modified.
    pub fn exec(&self, id: impl Into<Bson>, sub_id: impl Into<Bson>, value: &T) -> Result<()> {
        let (id, sub_id) = (id.into(), sub_id.into());
        let name = singular(self.coll.name());
        let fail = |e: &dyn std::fmt::Display| store_failure(format!("failed to update {name}: {e}"));

        let element = bson::to_bson(&(self.mapper)(value)).map_err(|e| fail(&e))?;
        let mut filter = key_filter(self.key, id.clone());
        filter.insert(format!("{}.{}", self.field, self.sub_key), sub_id.clone());
        let update = doc! { "$set": single(format!("{}.$", self.field), element) };

        let report = self.coll.update_one(&filter, &update).map_err(|e| fail(&e))?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errorz::ErrorKind;
    use crate::query::UpdateReport;
    use crate::test_support::*;

    fn update(coll: &MockCollection) -> Result<()> {
        EmbeddedUpdate::new(coll, "addresses", "id", to_store_address).exec(
            TEST_ID,
            TEST_ADDRESS_ID,
            &address(),
        )
    }

    #[test]
    fn success() {
        let coll = MockCollection::new().on_update_one(|| Ok(UpdateReport { matched: 1, modified: 1 }));
        update(&coll).unwrap();
        let call = coll.last_call();
        assert_eq!(call.filter, doc! { "id": TEST_ID, "addresses.id": TEST_ADDRESS_ID });
        assert_eq!(
            call.document,
            Some(doc! { "$set": { "addresses.$": { "id": TEST_ADDRESS_ID, "street": "Main St" } } })
        );
    }

    #[test]
    fn custom_key() {
        let coll = MockCollection::new().on_update_one(|| Ok(UpdateReport { matched: 1, modified: 1 }));
        EmbeddedUpdate::new(&coll, "nodes", "id", to_store_address)
            .key("modelId")
            .exec("m1", "n1", &address())
            .unwrap();
        assert_eq!(coll.last_call().filter, doc! { "modelId": "m1", "nodes.id": "n1" });
    }

    #[test]
    fn parent_not_found() {
        let coll = MockCollection::new().on_update_one(|| Ok(UpdateReport { matched: 0, modified: 0 }));
        let err = update(&coll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "person 1 not found");
    }

    #[test]
    fn element_not_found() {
        let coll = MockCollection::new().on_update_one(|| Ok(UpdateReport { matched: 1, modified: 0 }));
        let err = update(&coll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "field addresses[2] not found in person 1");
    }

    #[test]
    fn update_error() {
        let coll = MockCollection::new().on_update_one(|| Err(forced_error()));
        let err = update(&coll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.to_string().contains("failed to update person"));
    }
}
