use bson::{Bson, Document};
use std::cmp::Ordering;

use crate::errors::DbError;

/// Reports whether `doc` satisfies every condition in `filter`.
pub(crate) fn matches(doc: &Document, filter: &Document) -> Result<bool, DbError> {
    for (path, cond) in filter {
        if path.starts_with('$') {
            return Err(DbError::QueryError(format!("unsupported operator {path}")));
        }
        if !condition_holds(&values_at_path(doc, path), cond)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Every value reachable at a dotted path. Arrays on the way fan out into
/// their elements; an array at the end contributes itself and its elements.
pub(crate) fn values_at_path<'a>(doc: &'a Document, path: &str) -> Vec<&'a Bson> {
    let segs: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    if let Some((head, rest)) = segs.split_first()
        && let Some(v) = doc.get(*head)
    {
        collect(v, rest, &mut out);
    }
    out
}

fn collect<'a>(value: &'a Bson, segs: &[&str], out: &mut Vec<&'a Bson>) {
    let Some((head, rest)) = segs.split_first() else {
        out.push(value);
        if let Bson::Array(items) = value {
            out.extend(items.iter());
        }
        return;
    };
    match value {
        Bson::Document(d) => {
            if let Some(v) = d.get(*head) {
                collect(v, rest, out);
            }
        }
        Bson::Array(items) => {
            if let Ok(i) = head.parse::<usize>() {
                if let Some(v) = items.get(i) {
                    collect(v, rest, out);
                }
            } else {
                for item in items.iter().filter(|i| matches!(i, Bson::Document(_))) {
                    collect(item, segs, out);
                }
            }
        }
        _ => {}
    }
}

/// The single value at a dotted path, indexing arrays numerically.
pub(crate) fn value_at<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segs = path.split('.');
    let mut cur = doc.get(segs.next()?)?;
    for seg in segs {
        cur = match cur {
            Bson::Document(d) => d.get(seg)?,
            Bson::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cur)
}

fn is_operator_doc(d: &Document) -> bool {
    !d.is_empty() && d.keys().all(|k| k.starts_with('$'))
}

/// A missing field is tested as null, so `{field: null}` matches documents
/// without `field`.
pub(crate) fn condition_holds(values: &[&Bson], cond: &Bson) -> Result<bool, DbError> {
    let null = Bson::Null;
    let missing = [&null];
    let values: &[&Bson] = if values.is_empty() { &missing } else { values };
    match cond {
        Bson::Document(ops) if is_operator_doc(ops) => {
            for (op, arg) in ops {
                if !operator_holds(values, op, arg)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(values.iter().any(|v| bson_eq(v, cond))),
    }
}

fn operator_holds(values: &[&Bson], op: &str, arg: &Bson) -> Result<bool, DbError> {
    let cmp = |want: fn(Ordering) -> bool| {
        values.iter().any(|v| comparable(v, arg) && want(compare_bson(v, arg)))
    };
    let holds = match op {
        "$eq" => values.iter().any(|v| bson_eq(v, arg)),
        "$ne" => !values.iter().any(|v| bson_eq(v, arg)),
        "$gt" => cmp(Ordering::is_gt),
        "$gte" => cmp(Ordering::is_ge),
        "$lt" => cmp(Ordering::is_lt),
        "$lte" => cmp(Ordering::is_le),
        "$in" => {
            let Bson::Array(set) = arg else {
                return Err(DbError::QueryError("$in needs an array".into()));
            };
            values.iter().any(|v| set.iter().any(|x| bson_eq(v, x)))
        }
        other => return Err(DbError::QueryError(format!("unsupported operator {other}"))),
    };
    Ok(holds)
}

/// Whether an element of an array satisfies a `$pull` condition.
pub(crate) fn element_matches(element: &Bson, cond: &Bson) -> Result<bool, DbError> {
    match (element, cond) {
        (_, Bson::Document(ops)) if is_operator_doc(ops) => condition_holds(&[element], cond),
        (Bson::Document(d), Bson::Document(c)) => matches(d, c),
        _ => Ok(bson_eq(element, cond)),
    }
}

fn is_num(v: &Bson) -> bool {
    matches!(v, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_))
}

fn comparable(a: &Bson, b: &Bson) -> bool {
    (is_num(a) && is_num(b)) || type_rank(a) == type_rank(b)
}

/// Equality where numbers compare by value across BSON numeric types.
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    if is_num(a) && is_num(b) {
        return compare_bson(a, b) == Ordering::Equal;
    }
    a == b
}

pub(crate) fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    fn as_i64(x: &Bson) -> Option<i64> {
        match x {
            Bson::Int32(i) => Some(i64::from(*i)),
            Bson::Int64(i) => Some(*i),
            _ => None,
        }
    }
    fn as_f64(x: &Bson) -> f64 {
        match x {
            Bson::Int32(i) => f64::from(*i),
            Bson::Int64(i) => *i as f64,
            Bson::Double(f) => *f,
            Bson::Decimal128(d) => d.to_string().parse::<f64>().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }
    if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
        return x.cmp(&y);
    }
    if is_num(a) && is_num(b) {
        return as_f64(a).total_cmp(&as_f64(b));
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::DbPointer(_) => 12,
        Bson::JavaScriptCode(_) | Bson::JavaScriptCodeWithScope(_) => 13,
        Bson::MaxKey => 255,
    }
}

/// Index of the first element of the array at `field` that satisfies the
/// filter's `field.*` constraints (or a direct `field` condition).
pub(crate) fn positional_index(doc: &Document, filter: &Document, field: &str) -> Option<usize> {
    let Some(Bson::Array(items)) = value_at(doc, field) else {
        return None;
    };
    let prefix = format!("{field}.");
    let conds: Vec<(&str, &Bson)> = filter
        .iter()
        .filter_map(|(k, v)| k.strip_prefix(prefix.as_str()).map(|rest| (rest, v)))
        .collect();

    if conds.is_empty() {
        let cond = filter.get(field)?;
        return items.iter().position(|item| condition_holds(&[item], cond).unwrap_or(false));
    }
    items.iter().position(|item| {
        let Bson::Document(d) = item else {
            return false;
        };
        conds.iter().all(|(rest, cond)| condition_holds(&values_at_path(d, rest), cond).unwrap_or(false))
    })
}

fn is_included(flag: &Bson) -> bool {
    match flag {
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(f) => *f != 0.0,
        Bson::Boolean(b) => *b,
        _ => true,
    }
}

fn insert_nested(out: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            out.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(out.get(head), Some(Bson::Document(_))) {
                out.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = out.get_mut(head) {
                insert_nested(child, rest, value);
            }
        }
    }
}

/// Applies an inclusion projection. `field.$` keeps only the array element
/// the filter matched.
pub(crate) fn project(
    doc: &Document,
    projection: &Document,
    filter: &Document,
) -> Result<Document, DbError> {
    let mut out = Document::new();
    for (path, flag) in projection {
        if !is_included(flag) {
            return Err(DbError::QueryError("exclusion projections are not supported".into()));
        }
        if let Some(field) = path.strip_suffix(".$") {
            if let Some(i) = positional_index(doc, filter, field)
                && let Some(Bson::Array(items)) = value_at(doc, field)
                && let Some(item) = items.get(i)
            {
                insert_nested(&mut out, field, Bson::Array(vec![item.clone()]));
            }
            continue;
        }
        if let Some(v) = value_at(doc, path) {
            insert_nested(&mut out, path, v.clone());
        }
    }
    Ok(out)
}
