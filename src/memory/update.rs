use bson::{Bson, Document};

use super::eval::{element_matches, positional_index};
use crate::errors::DbError;

/// Applies an operator update to a copy of `doc`.
///
/// `filter` is the filter that selected `doc`; it resolves positional `$`
/// segments. Returns the updated copy and whether anything changed.
pub(crate) fn apply_update(
    doc: &Document,
    filter: &Document,
    update: &Document,
) -> Result<(Document, bool), DbError> {
    let mut next = doc.clone();
    let mut changed = false;

    for (op, fields) in update {
        let Bson::Document(fields) = fields else {
            return Err(DbError::UpdateError(format!("{op} needs a document")));
        };
        for (path, value) in fields {
            let segs = resolve_segments(doc, filter, path)?;
            let hit = match op.as_str() {
                "$set" => set_in_doc(&mut next, &segs, value.clone())?,
                "$push" => push(&mut next, &segs, value.clone())?,
                "$pull" => pull(&mut next, &segs, value)?,
                other if other.starts_with('$') => {
                    return Err(DbError::UpdateError(format!("unsupported operator {other}")));
                }
                _ => {
                    return Err(DbError::UpdateError(
                        "update document must contain only operators".into(),
                    ));
                }
            };
            changed |= hit;
        }
    }
    Ok((next, changed))
}

fn resolve_segments(doc: &Document, filter: &Document, path: &str) -> Result<Vec<String>, DbError> {
    let parts: Vec<&str> = path.split('.').collect();
    let mut segs = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        if *part != "$" {
            segs.push((*part).to_owned());
            continue;
        }
        let field = parts[..i].join(".");
        let index = positional_index(doc, filter, &field).ok_or_else(|| {
            DbError::UpdateError(format!("positional operator found no match in {field}"))
        })?;
        segs.push(index.to_string());
    }
    Ok(segs)
}

fn set_in_doc(doc: &mut Document, segs: &[String], value: Bson) -> Result<bool, DbError> {
    let Some((head, rest)) = segs.split_first() else {
        return Err(DbError::UpdateError("empty path".into()));
    };
    if rest.is_empty() {
        let old = doc.insert(head.as_str(), value.clone());
        return Ok(old.as_ref() != Some(&value));
    }
    match doc.get(head) {
        Some(Bson::Document(_) | Bson::Array(_)) => {}
        Some(_) => return Err(DbError::UpdateError(format!("cannot traverse {head}"))),
        None => {
            doc.insert(head.as_str(), Document::new());
        }
    }
    match doc.get_mut(head) {
        Some(Bson::Document(child)) => set_in_doc(child, rest, value),
        Some(Bson::Array(items)) => set_in_array(items, rest, value),
        _ => Err(DbError::UpdateError(format!("cannot traverse {head}"))),
    }
}

fn set_in_array(items: &mut [Bson], segs: &[String], value: Bson) -> Result<bool, DbError> {
    let Some((head, rest)) = segs.split_first() else {
        return Err(DbError::UpdateError("empty path".into()));
    };
    let slot = head
        .parse::<usize>()
        .ok()
        .and_then(|i| items.get_mut(i))
        .ok_or_else(|| DbError::UpdateError(format!("no array element {head}")))?;
    if rest.is_empty() {
        let changed = *slot != value;
        *slot = value;
        return Ok(changed);
    }
    match slot {
        Bson::Document(child) => set_in_doc(child, rest, value),
        Bson::Array(inner) => set_in_array(inner, rest, value),
        _ => Err(DbError::UpdateError(format!("cannot traverse {head}"))),
    }
}

fn slot_in_doc<'a>(doc: &'a mut Document, segs: &[String]) -> Option<&'a mut Bson> {
    let (head, rest) = segs.split_first()?;
    let slot = doc.get_mut(head)?;
    if rest.is_empty() { Some(slot) } else { slot_in_value(slot, rest) }
}

fn slot_in_value<'a>(value: &'a mut Bson, segs: &[String]) -> Option<&'a mut Bson> {
    match value {
        Bson::Document(d) => slot_in_doc(d, segs),
        Bson::Array(items) => {
            let (head, rest) = segs.split_first()?;
            let slot = items.get_mut(head.parse::<usize>().ok()?)?;
            if rest.is_empty() { Some(slot) } else { slot_in_value(slot, rest) }
        }
        _ => None,
    }
}

fn push(doc: &mut Document, segs: &[String], value: Bson) -> Result<bool, DbError> {
    match slot_in_doc(doc, segs) {
        Some(Bson::Array(items)) => {
            items.push(value);
            Ok(true)
        }
        Some(_) => Err(DbError::UpdateError(format!("{} is not an array", segs.join(".")))),
        None => set_in_doc(doc, segs, Bson::Array(vec![value])),
    }
}

fn pull(doc: &mut Document, segs: &[String], cond: &Bson) -> Result<bool, DbError> {
    let Some(Bson::Array(items)) = slot_in_doc(doc, segs) else {
        return Ok(false);
    };
    let mut keep = Vec::with_capacity(items.len());
    for item in items.iter() {
        keep.push(!element_matches(item, cond)?);
    }
    let before = items.len();
    let mut flags = keep.into_iter();
    items.retain(|_| flags.next().unwrap_or(true));
    Ok(items.len() != before)
}
