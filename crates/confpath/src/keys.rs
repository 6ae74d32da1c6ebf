//! Best-effort key inference for list entries when no schema is available.

use serde_json::{Map, Value};

use crate::error::KeyResolutionError;
use crate::types::{KeyField, Scalar};

/// Field names that identify an entry, in priority order.
pub const PREFERRED_KEY_FIELDS: [&str; 3] = ["name", "id", "key"];

/// Determine the field identifying one list entry.
///
/// Uses the first of `name`, `id`, `key` present in the entry, and otherwise
/// the entry's first field in document order. Exactly one field is returned;
/// entries whose real identity spans several fields get a single-field
/// address, and any resulting collision is caught by the tree builder.
///
/// ```
/// use confpath::v1::resolve_key;
/// use serde_json::json;
///
/// let entry = json!({"type": "eth", "name": "eth0", "mtu": 1500});
/// let key = resolve_key(entry.as_object().unwrap()).unwrap();
/// assert_eq!(key[0].name, "name");
/// assert_eq!(key[0].value.key_text(), "eth0");
/// ```
pub fn resolve_key(entry: &Map<String, Value>) -> Result<Vec<KeyField>, KeyResolutionError> {
    let (field, value) = PREFERRED_KEY_FIELDS
        .iter()
        .find_map(|f| entry.get(*f).map(|v| (*f, v)))
        .or_else(|| entry.iter().next().map(|(k, v)| (k.as_str(), v)))
        .ok_or(KeyResolutionError::EmptyEntry)?;

    let value = match value {
        Value::Null => {
            return Err(KeyResolutionError::NullKey {
                field: field.to_string(),
            });
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(KeyResolutionError::NonScalarKey {
                field: field.to_string(),
            });
        }
        other => Scalar::from_value(other).ok_or_else(|| KeyResolutionError::NonScalarKey {
            field: field.to_string(),
        })?,
    };

    Ok(vec![KeyField {
        name: field.to_string(),
        value,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(v: Value) -> Result<Vec<KeyField>, KeyResolutionError> {
        resolve_key(v.as_object().unwrap())
    }

    #[test]
    fn test_prefers_name() {
        let k = resolve(json!({"id": 1, "key": "k", "name": "n"})).unwrap();
        assert_eq!(k.len(), 1);
        assert_eq!(k[0].name, "name");
    }

    #[test]
    fn test_id_before_key() {
        let k = resolve(json!({"key": "k", "mtu": 9000, "id": 7})).unwrap();
        assert_eq!(k[0].name, "id");
        assert_eq!(k[0].value.key_text(), "7");
    }

    #[test]
    fn test_key_field() {
        let k = resolve(json!({"value": 3, "key": "k1"})).unwrap();
        assert_eq!(k[0].name, "key");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let k = resolve(json!({"ifindex": 3, "description": "uplink"})).unwrap();
        assert_eq!(k[0].name, "ifindex");
        assert_eq!(k[0].value.key_text(), "3");
    }

    #[test]
    fn test_non_scalar_key() {
        let err = resolve(json!({"name": {"first": "a"}})).unwrap_err();
        assert_eq!(
            err,
            KeyResolutionError::NonScalarKey {
                field: "name".into()
            }
        );
        let err = resolve(json!({"addresses": [1, 2]})).unwrap_err();
        assert_eq!(
            err,
            KeyResolutionError::NonScalarKey {
                field: "addresses".into()
            }
        );
    }

    #[test]
    fn test_preferred_field_wins_even_if_non_scalar() {
        // The policy picks the field first and only then checks its shape.
        let err = resolve(json!({"label": "x", "id": [1]})).unwrap_err();
        assert!(matches!(err, KeyResolutionError::NonScalarKey { .. }));
    }

    #[test]
    fn test_null_key() {
        let err = resolve(json!({"name": null, "v": 1})).unwrap_err();
        assert_eq!(
            err,
            KeyResolutionError::NullKey {
                field: "name".into()
            }
        );
    }

    #[test]
    fn test_empty_entry() {
        assert_eq!(resolve(json!({})).unwrap_err(), KeyResolutionError::EmptyEntry);
    }
}
