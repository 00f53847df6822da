//! Source feed-shape normalization.

use serde_json::Value;

/// Flattens a source response into a sequence of raw documents.
///
/// Source endpoints answer in one of several shapes:
/// - a bare JSON array of documents,
/// - a single-key object whose sole value is an array (OData-style `{"d": [...]}`),
/// - a single document object,
/// - `null` (nothing modified).
///
/// All are normalized to a flat `Vec` of raw values.
pub fn flatten(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            if map.len() == 1 {
                // Single-key wrapper: unwrap when the sole value is an array.
                let (key, inner) = map.into_iter().next().unwrap_or_default();
                match inner {
                    Value::Array(items) => items,
                    other => {
                        let mut rebuilt = serde_json::Map::new();
                        rebuilt.insert(key, other);
                        vec![Value::Object(rebuilt)]
                    }
                }
            } else {
                vec![Value::Object(map)]
            }
        }
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array() {
        let docs = flatten(json!([{"id": "1"}, {"id": "2"}]));
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["id"], "1");
    }

    #[test]
    fn single_key_wrapped_array() {
        let docs = flatten(json!({"d": [{"id": "1"}]}));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], "1");
    }

    #[test]
    fn single_object_passes_through() {
        let docs = flatten(json!({"id": "1", "name": "x"}));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "x");
    }

    #[test]
    fn single_key_object_without_array_is_one_document() {
        // A one-field document must not be mistaken for a wrapper.
        let docs = flatten(json!({"id": "1"}));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], "1");
    }

    #[test]
    fn null_is_empty() {
        assert!(flatten(Value::Null).is_empty());
    }
}
