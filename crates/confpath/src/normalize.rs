//! Envelope stripping for server responses.

use serde_json::Value;

/// The RESTCONF datastore wrapper some servers put around the root document.
pub const ENVELOPE_FIELD: &str = "ietf-restconf:data";

/// Strip the top-level envelope from a response, if present.
///
/// The envelope is recognised only when it is the sole field and wraps a
/// mapping that is not itself an envelope. That keeps the function
/// idempotent: `normalize(normalize(x)) == normalize(x)` for every `x`.
///
/// ```
/// use confpath::v1::normalize;
/// use serde_json::json;
///
/// let wrapped = json!({"ietf-restconf:data": {"system": {"hostname": "r1"}}});
/// assert_eq!(normalize(&wrapped), &json!({"system": {"hostname": "r1"}}));
///
/// let bare = json!({"system": {}});
/// assert_eq!(normalize(&bare), &bare);
/// ```
pub fn normalize(value: &Value) -> &Value {
    match unwrap_envelope(value) {
        Some(inner) => inner,
        None => value,
    }
}

/// Owning form of [`normalize`].
pub fn normalize_owned(value: Value) -> Value {
    if unwrap_envelope(&value).is_none() {
        return value;
    }
    match value {
        Value::Object(mut map) => map.remove(ENVELOPE_FIELD).unwrap_or(Value::Null),
        other => other,
    }
}

fn unwrap_envelope(value: &Value) -> Option<&Value> {
    let inner = as_envelope(value)?;
    if inner.is_object() && as_envelope(inner).is_none() {
        Some(inner)
    } else {
        None
    }
}

fn as_envelope(value: &Value) -> Option<&Value> {
    let map = value.as_object()?;
    if map.len() == 1 {
        map.get(ENVELOPE_FIELD)
    } else {
        None
    }
}
