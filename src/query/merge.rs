//! Ready-made merge functions for [`Query::add_criteria`](super::Query::add_criteria).
//!
//! The descriptor makes no assumption about merge semantics; these are
//! the common policies callers reach for.

use serde_json::{Map, Value};

use super::criteria::Criteria;
use super::errors::MergeConflict;

/// Right-biased key union: keys in `more` replace keys in `current`.
pub fn shallow(current: &Criteria, more: &Criteria) -> Criteria {
    current
        .iter()
        .chain(more.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Recursive union of nested objects, right-biased on non-object leaves.
///
/// `{"age": {"$gt": 18}}` merged with `{"age": {"$lt": 30}}` keeps both bounds.
pub fn deep(current: &Criteria, more: &Criteria) -> Criteria {
    let mut merged = current.clone().into_inner();
    for (key, incoming) in more.iter() {
        let value = match merged.remove(key) {
            Some(existing) => deep_value(existing, incoming.clone()),
            None => incoming.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged.into()
}

fn deep_value(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                let value = match left.remove(&key) {
                    Some(prev) => deep_value(prev, value),
                    None => value,
                };
                left.insert(key, value);
            }
            Value::Object(left)
        }
        (_, incoming) => incoming,
    }
}

/// Key union that refuses to overwrite: a key present in both with
/// different values is a [`MergeConflict`].
pub fn strict(current: &Criteria, more: &Criteria) -> Result<Criteria, MergeConflict> {
    let mut merged: Map<String, Value> = Map::new();
    for (key, value) in current.iter() {
        merged.insert(key.clone(), value.clone());
    }
    for (key, value) in more.iter() {
        match merged.get(key) {
            Some(existing) if existing != value => {
                return Err(MergeConflict {
                    key: key.clone(),
                    current: existing.clone(),
                    incoming: value.clone(),
                });
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(merged.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shallow_later_keys_win() {
        let current = Criteria::eq("color", json!("red")).with("size", json!("M"));
        let more = Criteria::eq("size", json!("L"));

        let merged = shallow(&current, &more);
        assert_eq!(merged.to_value(), json!({"color": "red", "size": "L"}));
    }

    #[test]
    fn test_shallow_replaces_nested_objects() {
        let current = Criteria::eq("age", json!({"$gt": 18}));
        let more = Criteria::eq("age", json!({"$lt": 30}));

        assert_eq!(shallow(&current, &more).to_value(), json!({"age": {"$lt": 30}}));
    }

    #[test]
    fn test_deep_keeps_both_bounds() {
        let current = Criteria::eq("age", json!({"$gt": 18}));
        let more = Criteria::eq("age", json!({"$lt": 30})).with("name", json!("Ann"));

        assert_eq!(
            deep(&current, &more).to_value(),
            json!({"age": {"$gt": 18, "$lt": 30}, "name": "Ann"})
        );
    }

    #[test]
    fn test_deep_leaf_is_right_biased() {
        let current = Criteria::eq("age", json!({"$gt": 18}));
        let more = Criteria::eq("age", json!(21));

        assert_eq!(deep(&current, &more).to_value(), json!({"age": 21}));
    }

    #[test]
    fn test_strict_accepts_identical_values() {
        let current = Criteria::eq("color", json!("red"));
        let more = Criteria::eq("color", json!("red")).with("size", json!("L"));

        let merged = strict(&current, &more).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_strict_rejects_conflict() {
        let current = Criteria::eq("color", json!("red"));
        let more = Criteria::eq("color", json!("blue"));

        let err = strict(&current, &more).unwrap_err();
        assert_eq!(err.key, "color");
        assert_eq!(err.current, json!("red"));
        assert_eq!(err.incoming, json!("blue"));
    }
}
