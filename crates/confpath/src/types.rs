use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::KeyResolutionError;

// ============================================================================
// Scalar values
// ============================================================================

/// A terminal, non-null value of a configuration document.
///
/// `null` is deliberately not a variant: leaves carry `Option<Scalar>` and
/// key fields must hold a real value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    /// Convert a JSON value, returning `None` for `null`, mappings and sequences.
    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The text used when this value appears in an address.
    ///
    /// Strings are used verbatim (no JSON quoting); numbers and booleans use
    /// their JSON spelling.
    pub fn key_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_text())
    }
}

/// One identifying field of a list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyField {
    pub name: String,
    pub value: Scalar,
}

// ============================================================================
// Nodes
// ============================================================================

/// A node of the resource tree.
///
/// Every node carries the address (`path`) that re-fetches or rewrites exactly
/// the subtree it represents. A child's path is always its parent's path
/// extended by one segment: `/name` for containers and leaves, `=key` for
/// list entries and leaf-list members.
///
/// Serialized externally tagged, so a tree dumps as
/// `[{"Container": {...}}, {"Leaf": {...}}]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Container(Container),
    ListContainer(ListContainer),
    ListEntry(ListEntry),
    Leaf(Leaf),
}

/// A grouping with no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub name: String,
    pub path: String,
    pub children: Vec<Node>,
}

/// A repeated resource.
///
/// `entries` holds [`Node::ListEntry`] values for a list of mappings and
/// [`Node::Leaf`] values for a leaf-list. A sequence mixing both keeps its
/// members in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListContainer {
    pub name: String,
    pub path: String,
    pub entries: Vec<Node>,
}

/// One addressable member of a list.
///
/// When the entry's key could not be resolved, `addressable` is false,
/// `error` says why and `children` is empty. Selecting such an entry is
/// refused by the console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub key_fields: Vec<KeyField>,
    pub path: String,
    pub children: Vec<Node>,
    pub addressable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<KeyResolutionError>,
}

/// A terminal value. `value` is `None` for a JSON `null`.
///
/// `error` is only ever set on a leaf-list member whose value is shared with
/// a sibling; such a member has no address of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaf {
    pub name: String,
    pub path: String,
    pub value: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<KeyResolutionError>,
}

impl Leaf {
    pub fn new(name: impl Into<String>, path: impl Into<String>, value: &Value) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            value: Scalar::from_value(value),
            error: None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

impl ListEntry {
    /// The resolved key text used in this entry's address, if any.
    pub fn key_text(&self) -> Option<String> {
        self.key_fields.first().map(|f| f.value.key_text())
    }
}

impl Node {
    pub fn path(&self) -> &str {
        match self {
            Node::Container(c) => &c.path,
            Node::ListContainer(l) => &l.path,
            Node::ListEntry(e) => &e.path,
            Node::Leaf(l) => &l.path,
        }
    }

    /// A short label: the field name, or `field=value` for list entries.
    pub fn label(&self) -> String {
        match self {
            Node::Container(c) => c.name.clone(),
            Node::ListContainer(l) => l.name.clone(),
            Node::ListEntry(e) => match e.key_fields.first() {
                Some(k) => format!("{}={}", k.name, k.value),
                None => "?".to_string(),
            },
            Node::Leaf(l) => l.name.clone(),
        }
    }

    /// Child nodes in document order. Leaves have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Container(c) => &c.children,
            Node::ListContainer(l) => &l.entries,
            Node::ListEntry(e) => &e.children,
            Node::Leaf(_) => &[],
        }
    }

    /// False for list members without a unique key: entries whose key failed
    /// to resolve or collides with a sibling, and repeated leaf-list values.
    pub fn is_addressable(&self) -> bool {
        match self {
            Node::ListEntry(e) => e.addressable,
            Node::Leaf(l) => l.error.is_none(),
            _ => true,
        }
    }

    /// Why this node has no address, if it has none.
    pub fn key_error(&self) -> Option<&KeyResolutionError> {
        match self {
            Node::ListEntry(e) => e.error.as_ref(),
            Node::Leaf(l) => l.error.as_ref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Container(_) => "container",
            Node::ListContainer(_) => "list",
            Node::ListEntry(_) => "entry",
            Node::Leaf(_) => "leaf",
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Events emitted by a displayed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The operator picked the node at this path.
    PathSelected(String),
}
