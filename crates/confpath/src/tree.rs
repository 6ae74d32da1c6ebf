//! Turning a configuration document into a tree of addressed nodes.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use crate::encode::{encode_list_path, join};
use crate::error::{KeyResolutionError, TreeError};
use crate::keys::resolve_key;
use crate::normalize::normalize;
use crate::types::{Container, KeyField, Leaf, ListContainer, ListEntry, Node, Scalar};

/// The structural shape of a document value.
///
/// This is the only place values are classified; the builder dispatches on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// A scalar or `null`.
    Scalar,
    Mapping(&'a Map<String, Value>),
    /// A sequence whose members are all mappings (includes the empty sequence).
    List(&'a [Value]),
    /// A sequence of scalars and `null`s.
    LeafList(&'a [Value]),
    /// Anything else: mappings mixed with scalars, or nested sequences.
    Mixed(&'a [Value]),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Shape<'a> {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Shape::Scalar,
            Value::Object(map) => Shape::Mapping(map),
            Value::Array(items) => {
                if items.iter().all(Value::is_object) {
                    Shape::List(items)
                } else if items.iter().all(|v| !v.is_object() && !v.is_array()) {
                    Shape::LeafList(items)
                } else {
                    Shape::Mixed(items)
                }
            }
        }
    }
}

/// Build the tree for a whole response body.
///
/// Strips the envelope, requires a mapping at the root and builds with an
/// empty base path.
///
/// ```
/// use confpath::v1::{build_document, Node};
/// use serde_json::json;
///
/// let doc = json!({
///     "a": {"b": 1},
///     "list": [{"name": "x", "v": 1}, {"name": "y", "v": 2}]
/// });
/// let nodes = build_document(&doc).unwrap();
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[0].children()[0].path(), "a/b");
/// assert_eq!(nodes[1].children()[1].path(), "list=y");
/// ```
pub fn build_document(value: &Value) -> Result<Vec<Node>, TreeError> {
    match normalize(value) {
        Value::Object(map) => Ok(build(map, "")),
        other => Err(TreeError::NotAMapping {
            found: value_kind(other),
        }),
    }
}

/// Build one node per field of `doc`, in document order, under `base`.
pub fn build(doc: &Map<String, Value>, base: &str) -> Vec<Node> {
    doc.iter()
        .map(|(name, value)| build_node(name, value, base))
        .collect()
}

fn build_node(name: &str, value: &Value, base: &str) -> Node {
    let path = join(base, name);
    match Shape::of(value) {
        Shape::Scalar => Node::Leaf(Leaf::new(name, path, value)),
        Shape::Mapping(map) => {
            let children = build(map, &path);
            Node::Container(Container {
                name: name.to_string(),
                path,
                children,
            })
        }
        Shape::List(items) | Shape::Mixed(items) => Node::ListContainer(ListContainer {
            name: name.to_string(),
            entries: build_members(name, items, base, false),
            path,
        }),
        Shape::LeafList(items) => Node::ListContainer(ListContainer {
            name: name.to_string(),
            entries: build_members(name, items, base, true),
            path,
        }),
    }
}

/// Key segment for members that have no usable key. `%` is always escaped
/// in real keys, so no resolved key can encode to it.
const UNKEYED: &str = "%";

/// A list member after key resolution, before addresses are checked for
/// uniqueness.
enum Member<'a> {
    Entry {
        fields: &'a Map<String, Value>,
        key_fields: Vec<KeyField>,
        key: String,
    },
    LeafValue {
        value: &'a Value,
        key: String,
    },
    Unkeyed(KeyResolutionError),
}

impl Member<'_> {
    fn key(&self) -> Option<&str> {
        match self {
            Member::Entry { key, .. } | Member::LeafValue { key, .. } => Some(key.as_str()),
            Member::Unkeyed(_) => None,
        }
    }
}

fn classify(item: &Value, leaf_list: bool) -> Member<'_> {
    match item {
        Value::Object(fields) => match resolve_key(fields) {
            // Only the first identifying field goes into the address.
            Ok(key_fields) => Member::Entry {
                key: key_fields[0].value.key_text(),
                fields,
                key_fields,
            },
            Err(e) => Member::Unkeyed(e),
        },
        Value::Array(_) => Member::Unkeyed(KeyResolutionError::NotAnEntry),
        scalar if leaf_list => Member::LeafValue {
            value: scalar,
            key: Scalar::from_value(scalar)
                .map(|s| s.key_text())
                .unwrap_or_default(),
        },
        _ => Member::Unkeyed(KeyResolutionError::NotAnEntry),
    }
}

/// Build the members of one sequence. Every member whose key text is shared
/// with a sibling is flagged, the first occurrence included.
fn build_members(list: &str, items: &[Value], base: &str, leaf_list: bool) -> Vec<Node> {
    let members: Vec<Member> = items.iter().map(|item| classify(item, leaf_list)).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in members.iter().filter_map(Member::key) {
        *counts.entry(key).or_default() += 1;
    }
    let duplicated: HashSet<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(key, _)| key.to_string())
        .collect();

    members
        .into_iter()
        .map(|member| match member {
            Member::Entry {
                fields,
                key_fields,
                key,
            } => {
                let path = encode_list_path(base, list, &key);
                if duplicated.contains(&key) {
                    return Node::ListEntry(ListEntry {
                        key_fields,
                        path,
                        children: Vec::new(),
                        addressable: false,
                        error: Some(KeyResolutionError::DuplicateKey { key }),
                    });
                }
                Node::ListEntry(ListEntry {
                    children: build(fields, &path),
                    key_fields,
                    path,
                    addressable: true,
                    error: None,
                })
            }
            Member::LeafValue { value, key } => {
                let mut leaf = Leaf::new(list, encode_list_path(base, list, &key), value);
                if duplicated.contains(&key) {
                    leaf.error = Some(KeyResolutionError::DuplicateKey { key });
                }
                Node::Leaf(leaf)
            }
            Member::Unkeyed(error) => Node::ListEntry(unaddressable(
                format!("{}={}", join(base, list), UNKEYED),
                error,
            )),
        })
        .collect()
}

fn unaddressable(path: String, error: KeyResolutionError) -> ListEntry {
    ListEntry {
        key_fields: Vec::new(),
        path,
        children: Vec::new(),
        addressable: false,
        error: Some(error),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
