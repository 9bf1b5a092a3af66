use crate::errorz::DomainError;
use bson::{Bson, Document};

pub(crate) const LOG_TARGET: &str = crate::logger::QUERY_TARGET;

/// Returns the singular form of a plural collection name.
///
/// ```
/// use powermesh_core::query::singular;
///
/// assert_eq!(singular("bodies"), "body");
/// assert_eq!(singular("classes"), "class");
/// assert_eq!(singular("tests"), "test");
/// assert_eq!(singular("single"), "single");
/// ```
#[must_use]
pub fn singular(plural: &str) -> String {
    if !plural.ends_with('s') {
        return plural.to_owned();
    }
    if let Some(stem) = plural.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if let Some(stem) = plural.strip_suffix("es") {
        return stem.to_owned();
    }
    plural.strip_suffix('s').unwrap_or(plural).to_owned()
}

pub(crate) fn store_failure(message: String) -> DomainError {
    log::warn!(target: LOG_TARGET, "{message}");
    DomainError::Store(message)
}

pub(crate) fn not_found(message: String) -> DomainError {
    log::debug!(target: LOG_TARGET, "{message}");
    DomainError::NotFound(message)
}

/// A one-entry document; `doc!` needs literal keys.
pub(crate) fn single(key: impl Into<String>, value: impl Into<Bson>) -> Document {
    let mut d = Document::new();
    d.insert(key.into(), value.into());
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_cases() {
        assert_eq!(singular("bodies"), "body");
        assert_eq!(singular("classes"), "class");
        assert_eq!(singular("tests"), "test");
        assert_eq!(singular("persons"), "person");
        assert_eq!(singular("meshes"), "mesh");
        assert_eq!(singular("single"), "single");
        assert_eq!(singular("s"), "");
        assert_eq!(singular(""), "");
    }
}
