//! Deep merge of JSON documents.

use serde_json::Value;

/// Merges `other` over `original` and returns the result.
///
/// Objects merge key by key, recursing into nested objects. Every other value
/// kind (arrays included) in `other` replaces the value in `original`. A key
/// written as `-=name` in `other` removes `name` from the result.
pub fn merge_object(original: &Value, other: &Value) -> Value {
    let mut merged = original.clone();
    merge_into(&mut merged, other);
    merged
}

/// In-place variant of [`merge_object`].
pub fn merge_into(target: &mut Value, other: &Value) {
    match (target, other) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if let Some(removed) = key.strip_prefix("-=") {
                    target.remove(removed);
                    continue;
                }
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_into(existing, value);
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, other) => *target = other.clone(),
    }
}
