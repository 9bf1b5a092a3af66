use bson::{Bson, Document};
use serde::de::DeserializeOwned;

use super::filter::{Plain, key_filter};
use super::types::{Collection, DEFAULT_KEY, FromStore};
use super::util::{not_found, single, singular, store_failure};
use crate::errorz::Result;

/// Reads one array element, addressed by its sub-key, from a parent document.
///
/// The parent is fetched with a positional projection so only the matched
/// element comes back; the mapper extracts it from the parent shape.
pub struct EmbeddedGetOne<'c, D, T> {
    coll: &'c dyn Collection,
    field: &'c str,
    sub_key: &'c str,
    mapper: FromStore<D, T>,
    key: &'c str,
}

impl<D, T> Clone for EmbeddedGetOne<'_, D, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D, T> Copy for EmbeddedGetOne<'_, D, T> {}

impl<'c, D, T> EmbeddedGetOne<'c, D, T> {
    pub fn new(
        coll: &'c dyn Collection,
        field: &'c str,
        sub_key: &'c str,
        mapper: FromStore<D, T>,
    ) -> Self {
        Self { coll, field, sub_key, mapper, key: DEFAULT_KEY }
    }

    #[must_use]
    pub fn key(&self, key: &'c str) -> Self {
        Self { key, ..*self }
    }
}

impl<D: DeserializeOwned, T> EmbeddedGetOne<'_, D, T> {
    pub fn exec(&self, id: impl Into<Bson>, sub_id: impl Into<Bson>) -> Result<T> {
        let (id, sub_id) = (id.into(), sub_id.into());
        let name = singular(self.coll.name());
        let fail = |e: &dyn std::fmt::Display| store_failure(format!("failed to get {name}: {e}"));

        let mut filter = key_filter(self.key, id.clone());
        filter.insert(format!("{}.{}", self.field, self.sub_key), sub_id);
        let projection: Document = single(format!("{}.$", self.field), 1);

        let Some(parent) = self.coll.find_one(&filter, Some(&projection)).map_err(|e| fail(&e))?
        else {
            return Err(not_found(format!(
                "field {}[{}] not found in {name} {}",
                self.field,
                self.sub_key,
                Plain(&id)
            )));
        };
        let record: D = bson::from_document(parent).map_err(|e| fail(&e))?;
        Ok((self.mapper)(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errorz::ErrorKind;
    use crate::test_support::*;
    use bson::doc;

    fn get(coll: &MockCollection) -> Result<Address> {
        EmbeddedGetOne::new(coll, "addresses", "id", first_address).exec(TEST_ID, TEST_ADDRESS_ID)
    }

    #[test]
    fn success() {
        let coll = MockCollection::new().on_find_one(|| Ok(Some(store_person_doc())));
        assert_eq!(get(&coll).unwrap(), address());
        let call = coll.last_call();
        assert_eq!(call.filter, doc! { "id": TEST_ID, "addresses.id": TEST_ADDRESS_ID });
        assert_eq!(call.projection, Some(doc! { "addresses.$": 1 }));
    }

    #[test]
    fn not_found() {
        let coll = MockCollection::new().on_find_one(|| Ok(None));
        let err = get(&coll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "field addresses[id] not found in person 1");
    }

    #[test]
    fn find_error() {
        let coll = MockCollection::new().on_find_one(|| Err(forced_error()));
        let err = get(&coll).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.to_string().contains("failed to get person"));
        assert!(err.to_string().contains("forced error"));
    }
}
