//! Documents and their normalization
//!
//! Documents are explicit, ordered string-keyed records. Field lookups accept
//! either a literal key or a dotted path into nested objects.

use serde::Serialize;
use serde_json::{Map, Value};

/// A stored record
pub type Document = Map<String, Value>;

/// Looks up a field by literal key first, then by dotted path.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    if let Some(value) = doc.get(path) {
        return Some(value);
    }
    if !path.contains('.') {
        return None;
    }

    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes a value at a dotted path, creating intermediate objects.
///
/// A non-object value sitting on the path is replaced.
pub fn set_path(doc: &mut Document, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = match segments.pop() {
        Some(last) => last,
        None => return,
    };

    let mut current = doc;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

/// Flattens nested objects into dotted keys.
///
/// Arrays and scalars are kept as values. A non-object top level yields an
/// empty document.
pub fn flatten(value: &Value) -> Document {
    let mut out = Document::new();
    if let Value::Object(map) = value {
        flatten_into(&mut out, "", map);
    }
    out
}

fn flatten_into(out: &mut Document, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) if !inner.is_empty() && !is_extended_json(inner) => {
                flatten_into(out, &name, inner)
            }
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}

/// Serializes an entity and flattens it.
///
/// Returns `None` when the entity does not serialize to an object.
pub fn to_flat_document<T: Serialize>(entity: &T) -> serde_json::Result<Option<Document>> {
    match serde_json::to_value(entity)? {
        value @ Value::Object(_) => Ok(Some(flatten(&value))),
        _ => Ok(None),
    }
}

const EXTENDED_JSON_KEYS: [&str; 3] = ["$oid", "$date", "$numberLong"];

fn is_extended_json(map: &Map<String, Value>) -> bool {
    map.len() == 1
        && map
            .keys()
            .next()
            .map_or(false, |k| EXTENDED_JSON_KEYS.contains(&k.as_str()))
}

/// Collapses extended-JSON wrappers into plain values at any depth.
///
/// `{"$oid": h}` and `{"$date": d}` become their inner value,
/// `{"$numberLong": "n"}` becomes a number when it parses.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if is_extended_json(&map) {
                return collapse(map);
            }
            Value::Object(
                map.into_iter()
                    .map(|(key, inner)| (key, normalize(inner)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

fn collapse(map: Map<String, Value>) -> Value {
    match map.into_iter().next() {
        Some((key, Value::String(s))) if key == "$numberLong" => match s.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(s),
        },
        Some((_, inner)) => normalize(inner),
        None => Value::Null,
    }
}

/// Normalizes every value of a document
pub fn normalize_document(doc: Document) -> Document {
    doc.into_iter()
        .map(|(key, value)| (key, normalize(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_get_path_literal_and_nested() {
        let d = doc(json!({"a.b": 1, "c": {"d": {"e": 2}}, "list": [10, 20]}));
        assert_eq!(get_path(&d, "a.b"), Some(&json!(1)));
        assert_eq!(get_path(&d, "c.d.e"), Some(&json!(2)));
        assert_eq!(get_path(&d, "list.1"), Some(&json!(20)));
        assert_eq!(get_path(&d, "c.x"), None);
    }

    #[test]
    fn test_set_path_creates_objects() {
        let mut d = Document::new();
        set_path(&mut d, "date.date", json!("2014-12-11"));
        set_path(&mut d, "name", json!("John"));
        assert_eq!(Value::Object(d), json!({"date": {"date": "2014-12-11"}, "name": "John"}));
    }

    #[test]
    fn test_flatten_nested() {
        let flat = flatten(&json!({"name": "x", "address": {"city": "Kyoto", "zip": {"code": 1}}, "tags": ["a"]}));
        assert_eq!(flat.get("address.city"), Some(&json!("Kyoto")));
        assert_eq!(flat.get("address.zip.code"), Some(&json!(1)));
        assert_eq!(flat.get("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn test_flatten_non_object_is_empty() {
        assert!(flatten(&json!(5)).is_empty());
        assert_eq!(to_flat_document(&5).unwrap(), None);
    }

    #[test]
    fn test_normalize_extended_json() {
        let value = normalize(json!({
            "_id": {"$oid": "5f0000000000000000000001"},
            "count": {"$numberLong": "42"},
            "nested": [{"at": {"$date": "2014-12-11"}}]
        }));
        assert_eq!(
            value,
            json!({
                "_id": "5f0000000000000000000001",
                "count": 42,
                "nested": [{"at": "2014-12-11"}]
            })
        );
    }
}
