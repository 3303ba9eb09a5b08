//! Document sorting for the in-memory engine
//!
//! Multi-key, stable, with a total order across value types.

use std::cmp::Ordering;

use serde_json::Value;

use super::document::{get_path, Document};
use crate::compiler::SortSpec;

/// Sorts documents by a sort spec
pub struct DocumentSorter;

impl DocumentSorter {
    /// Sorts in place. Earlier keys take precedence; ties keep input order.
    pub fn sort(documents: &mut [Document], spec: &SortSpec) {
        if spec.is_empty() {
            return;
        }
        documents.sort_by(|a, b| {
            for (field, direction) in spec.keys() {
                let ordering = compare_values(get_path(a, field), get_path(b, field));
                let ordering = if *direction < 0 {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over optional values.
///
/// Missing < null < bool < number < string < array < object. Arrays compare
/// element-wise; objects compare equal.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let rank = type_rank(a).cmp(&type_rank(b));
            if rank != Ordering::Equal {
                return rank;
            }
            match (a, b) {
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                (Value::Number(x), Value::Number(y)) => {
                    let x = x.as_f64().unwrap_or(0.0);
                    let y = y.as_f64().unwrap_or(0.0);
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                }
                (Value::String(x), Value::String(y)) => x.cmp(y),
                (Value::Array(x), Value::Array(y)) => {
                    for (ex, ey) in x.iter().zip(y.iter()) {
                        let ordering = compare_values(Some(ex), Some(ey));
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                    x.len().cmp(&y.len())
                }
                _ => Ordering::Equal,
            }
        }
    }
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

    fn ids(docs: &[Document]) -> Vec<i64> {
        docs.iter().map(|d| d["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_multi_key_sort() {
        let mut docs = vec![
            doc(json!({"id": 1, "orders": 3, "name": "b"})),
            doc(json!({"id": 2, "orders": 5, "name": "a"})),
            doc(json!({"id": 3, "orders": 3, "name": "a"})),
        ];
        let spec = SortSpec::new(vec![("orders".into(), -1), ("name".into(), 1)]);
        DocumentSorter::sort(&mut docs, &spec);
        assert_eq!(ids(&docs), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut docs = vec![
            doc(json!({"id": 1, "orders": 3})),
            doc(json!({"id": 2, "orders": 3})),
            doc(json!({"id": 3, "orders": 3})),
        ];
        DocumentSorter::sort(&mut docs, &SortSpec::new(vec![("orders".into(), 1)]));
        assert_eq!(ids(&docs), vec![1, 2, 3]);
    }

    #[test]
    fn test_type_order() {
        let mut docs = vec![
            doc(json!({"id": 1, "v": "text"})),
            doc(json!({"id": 2, "v": 10})),
            doc(json!({"id": 3})),
            doc(json!({"id": 4, "v": null})),
            doc(json!({"id": 5, "v": true})),
        ];
        DocumentSorter::sort(&mut docs, &SortSpec::new(vec![("v".into(), 1)]));
        assert_eq!(ids(&docs), vec![3, 4, 5, 2, 1]);
    }

    #[test]
    fn test_mixed_integer_and_float() {
        assert_eq!(
            compare_values(Some(&json!(2)), Some(&json!(2.5))),
            Ordering::Less
        );
    }
}
