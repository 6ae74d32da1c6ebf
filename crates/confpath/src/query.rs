//! Traversal and lookup over built trees.

use crate::types::Node;

/// One node seen during a pre-order [`walk`].
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a Node,
    pub parent: Option<&'a Node>,
    /// 0 for the top-level nodes.
    pub depth: usize,
}

/// All nodes in pre-order (document order), with their parent and depth.
pub fn walk(nodes: &[Node]) -> Vec<Visit<'_>> {
    let mut out = Vec::new();
    let mut stack: Vec<Visit<'_>> = nodes
        .iter()
        .rev()
        .map(|node| Visit {
            node,
            parent: None,
            depth: 0,
        })
        .collect();

    while let Some(visit) = stack.pop() {
        for child in visit.node.children().iter().rev() {
            stack.push(Visit {
                node: child,
                parent: Some(visit.node),
                depth: visit.depth + 1,
            });
        }
        out.push(visit);
    }
    out
}

/// Find the node whose path is exactly `path`.
///
/// Only subtrees whose path is a prefix of `path` are searched.
///
/// ```
/// use confpath::v1::{build_document, query};
/// use serde_json::json;
///
/// let nodes = build_document(&json!({"users": [{"name": "a/b", "uid": 7}]})).unwrap();
/// let uid = query::find(&nodes, "users=a%2Fb/uid").unwrap();
/// assert_eq!(uid.label(), "uid");
/// assert!(query::find(&nodes, "users=c").is_none());
/// ```
pub fn find<'a>(nodes: &'a [Node], path: &str) -> Option<&'a Node> {
    let mut level = nodes;
    loop {
        let next = level.iter().find(|n| is_self_or_ancestor(n.path(), path))?;
        if next.path() == path {
            return Some(next);
        }
        level = next.children();
    }
}

fn is_self_or_ancestor(candidate: &str, path: &str) -> bool {
    match path.strip_prefix(candidate) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('='),
        None => false,
    }
}

/// Total number of nodes, list entries and leaf-list members included.
pub fn count(nodes: &[Node]) -> usize {
    nodes.iter().map(|n| 1 + count(n.children())).sum()
}

/// Every node path in pre-order.
pub fn all_paths(nodes: &[Node]) -> Vec<&str> {
    walk(nodes).into_iter().map(|v| v.node.path()).collect()
}

/// List members without a unique address, in pre-order.
pub fn non_addressable(nodes: &[Node]) -> Vec<&Node> {
    walk(nodes)
        .into_iter()
        .map(|v| v.node)
        .filter(|n| !n.is_addressable())
        .collect()
}

/// Whether `child` is `parent` extended by exactly one segment.
///
/// A segment is either `/name` or `=escaped-key`. At the root (empty parent)
/// the child must be a single name.
pub fn is_child_path(parent: &str, child: &str) -> bool {
    if parent.is_empty() {
        return !child.is_empty() && !child.contains('/');
    }
    let Some(rest) = child.strip_prefix(parent) else {
        return false;
    };
    if let Some(name) = rest.strip_prefix('/') {
        !name.is_empty() && !name.contains('/')
    } else if let Some(key) = rest.strip_prefix('=') {
        !key.contains('/')
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_document;
    use serde_json::json;

    fn sample() -> Vec<Node> {
        build_document(&json!({
            "system": {"hostname": "r1", "dns": ["1.1.1.1"]},
            "user": [
                {"name": "ops", "shell": "/bin/sh"},
                {"name": "guest", "shell": "/bin/zsh"},
                {"name": "op", "shell": "/bin/bash"},
                {"name": "guest", "shell": "/bin/false"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_walk_preorder_with_depth() {
        let nodes = sample();
        let visits = walk(&nodes);
        let order: Vec<(&str, usize)> = visits.iter().map(|v| (v.node.path(), v.depth)).collect();
        assert_eq!(
            order[..4],
            [
                ("system", 0),
                ("system/hostname", 1),
                ("system/dns", 1),
                ("system/dns=1.1.1.1", 2),
            ]
        );
        assert_eq!(order[4], ("user", 0));
        assert!(visits[0].parent.is_none());
        assert_eq!(visits[1].parent.unwrap().path(), "system");
    }

    #[test]
    fn test_count() {
        let nodes = sample();
        // system, hostname, dns, dns member, user, 4 entries, 2x2 entry children
        assert_eq!(count(&nodes), 13);
        assert_eq!(count(&nodes), walk(&nodes).len());
    }

    #[test]
    fn test_find() {
        let nodes = sample();
        assert_eq!(find(&nodes, "system").unwrap().kind(), "container");
        assert_eq!(find(&nodes, "system/dns=1.1.1.1").unwrap().kind(), "leaf");
        assert_eq!(
            find(&nodes, "user=ops/shell").unwrap().label(),
            "shell".to_string()
        );
        assert!(find(&nodes, "system/missing").is_none());
        assert!(find(&nodes, "").is_none());
    }

    #[test]
    fn test_find_prefix_sibling() {
        // "user=op" is a prefix of "user=ops"; lookup must still be exact.
        let nodes = sample();
        let op = find(&nodes, "user=op").unwrap();
        assert_eq!(op.path(), "user=op");
        let shell = find(&nodes, "user=op/shell").unwrap();
        assert_eq!(shell.path(), "user=op/shell");
    }

    #[test]
    fn test_find_respects_segment_boundaries() {
        let nodes = build_document(&json!({"a": {"x": 1}, "ab": {"x": 2}})).unwrap();
        let x = find(&nodes, "ab/x").unwrap();
        assert_eq!(x.path(), "ab/x");
    }

    #[test]
    fn test_non_addressable() {
        let nodes = sample();
        let bad: Vec<&str> = non_addressable(&nodes).iter().map(|n| n.path()).collect();
        assert_eq!(bad, vec!["user=guest", "user=guest"]);
        assert!(find(&nodes, "user=guest/shell").is_none());
    }

    #[test]
    fn test_non_addressable_includes_repeated_leaf_list_values() {
        let nodes = build_document(&json!({"tags": ["a", "b", "a"]})).unwrap();
        let bad: Vec<&str> = non_addressable(&nodes).iter().map(|n| n.path()).collect();
        assert_eq!(bad, vec!["tags=a", "tags=a"]);
    }

    #[test]
    fn test_find_keeps_placeholder_apart_from_empty_key() {
        let nodes = build_document(&json!({"l": [{"k": ""}, {"k": {"x": 1}}]})).unwrap();
        let real = find(&nodes, "l=").unwrap();
        assert!(real.is_addressable());
        assert_eq!(real.children()[0].path(), "l=/k");
        let placeholder = find(&nodes, "l=%").unwrap();
        assert!(!placeholder.is_addressable());
    }

    #[test]
    fn test_all_paths() {
        let nodes = sample();
        let paths = all_paths(&nodes);
        assert!(paths.contains(&"user=op/shell"));
        assert_eq!(paths.len(), count(&nodes));
    }

    #[test]
    fn test_is_child_path() {
        assert!(is_child_path("", "a"));
        assert!(!is_child_path("", "a/b"));
        assert!(!is_child_path("", ""));
        assert!(is_child_path("a", "a/b"));
        assert!(is_child_path("a/list", "a/list=k%2Fv"));
        assert!(is_child_path("a/list", "a/list="));
        assert!(is_child_path("a/list", "a/list=%"));
        assert!(!is_child_path("a", "a/b/c"));
        assert!(!is_child_path("a", "ab"));
        assert!(!is_child_path("a", "b/c"));
        assert!(!is_child_path("a", "a"));
    }
}
