use super::filter::Filter;
use super::types::Collection;
use super::util::store_failure;
use crate::errorz::Result;

/// Counts documents matching a filter.
#[derive(Clone, Copy)]
pub struct Count<'c> {
    coll: &'c dyn Collection,
}

impl<'c> Count<'c> {
    pub fn new(coll: &'c dyn Collection) -> Self {
        Self { coll }
    }

    pub fn exec(&self, filter: &Filter) -> Result<u64> {
        self.coll
            .count_documents(filter.as_document())
            .map_err(|e| store_failure(format!("failed to count {}: {e}", self.coll.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errorz::ErrorKind;
    use crate::test_support::*;

    #[test]
    fn returns_driver_count() {
        let coll = MockCollection::new().on_count_documents(|| Ok(2));
        assert_eq!(Count::new(&coll).exec(&Filter::new().gt("age", 20)).unwrap(), 2);
    }

    #[test]
    fn count_error() {
        let coll = MockCollection::new().on_count_documents(|| Err(forced_error()));
        let err = Count::new(&coll).exec(&Filter::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(err.to_string().contains("failed to count persons"));
    }
}
