use bson::{Bson, Document};
use std::fmt;

use super::types::resolve_key;

/// A field-to-condition mapping in the store's native shape.
///
/// Every builder method consumes the filter and returns it with one more
/// condition; setting a field twice keeps the last condition. Field names are
/// passed through unchecked.
///
/// ```
/// use powermesh_core::query::Filter;
///
/// let f = Filter::new().gt("age", 20);
/// assert_eq!(f.to_bson(), bson::doc! { "age": { "$gt": 20 } });
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Document);

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self(Document::new())
    }

    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn ne(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, "$ne", value.into())
    }

    #[must_use]
    pub fn gt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, "$gt", value.into())
    }

    #[must_use]
    pub fn gte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, "$gte", value.into())
    }

    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, "$lt", value.into())
    }

    #[must_use]
    pub fn lte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.op(field, "$lte", value.into())
    }

    /// Matches documents whose field equals any of `values`.
    #[must_use]
    pub fn in_<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.op(field, "$in", Bson::Array(values))
    }

    fn op(mut self, field: impl Into<String>, op: &str, value: Bson) -> Self {
        let mut cond = Document::new();
        cond.insert(op, value);
        self.0.insert(field.into(), cond);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_document(&self) -> &Document {
        &self.0
    }

    #[must_use]
    pub fn to_bson(&self) -> Document {
        self.0.clone()
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Document> for Filter {
    fn from(d: Document) -> Self {
        Self(d)
    }
}

impl From<Filter> for Document {
    fn from(f: Filter) -> Self {
        f.0
    }
}

/// Addresses documents either by identifier or by an explicit filter.
///
/// An identifier becomes `{key: id}` where `key` is the query's key field.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Id(Bson),
    Filter(Filter),
}

impl Selector {
    #[must_use]
    pub fn to_document(&self, key: &str) -> Document {
        match self {
            Selector::Id(id) => key_filter(key, id.clone()),
            Selector::Filter(f) => f.to_bson(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "{}", Plain(id)),
            Selector::Filter(filter) => write!(f, "{}", filter.as_document()),
        }
    }
}

impl From<Filter> for Selector {
    fn from(f: Filter) -> Self {
        Selector::Filter(f)
    }
}

impl From<Document> for Selector {
    fn from(d: Document) -> Self {
        Selector::Filter(Filter(d))
    }
}

impl From<Bson> for Selector {
    fn from(v: Bson) -> Self {
        match v {
            Bson::Document(d) => Selector::Filter(Filter(d)),
            other => Selector::Id(other),
        }
    }
}

impl From<&str> for Selector {
    fn from(id: &str) -> Self {
        Selector::Id(Bson::String(id.to_owned()))
    }
}

impl From<String> for Selector {
    fn from(id: String) -> Self {
        Selector::Id(Bson::String(id))
    }
}

impl From<&String> for Selector {
    fn from(id: &String) -> Self {
        Selector::Id(Bson::String(id.clone()))
    }
}

impl From<i32> for Selector {
    fn from(id: i32) -> Self {
        Selector::Id(Bson::Int32(id))
    }
}

impl From<i64> for Selector {
    fn from(id: i64) -> Self {
        Selector::Id(Bson::Int64(id))
    }
}

/// `{key: id}`, with an empty key falling back to the default key.
pub(crate) fn key_filter(key: &str, id: Bson) -> Document {
    let mut d = Document::new();
    d.insert(resolve_key(key), id);
    d
}

/// Displays a value the way messages quote identifiers: strings bare.
pub(crate) struct Plain<'a>(pub &'a Bson);

impl fmt::Display for Plain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Bson::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}
