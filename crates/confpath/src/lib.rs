#![doc = include_str!("../README.md")]

mod encode;
mod error;
mod keys;
mod normalize;
mod query;
mod tree;
mod types;

pub mod v1 {
    //! Versioned public API for confpath trees and addresses.
    //!
    //! # Tree model
    //!
    //! - [`Node`]: one of [`Container`], [`ListContainer`], [`ListEntry`], [`Leaf`]
    //! - [`Scalar`], [`KeyField`]: terminal values and list-entry identity
    //! - [`TreeEvent`]: what a displayed tree reports to the edit workflow
    //!
    //! # Building
    //!
    //! - [`normalize`] / [`normalize_owned`]: strip the `ietf-restconf:data` envelope
    //! - [`resolve_key`]: pick the identifying field of a list entry
    //! - [`build_document`] / [`build`]: document to nodes, dispatching on [`Shape`]
    //!
    //! # Addressing
    //!
    //! - [`join`], [`encode_list_path`]: build paths
    //! - [`escape`], [`decode`], [`split_list_segment`]: key escaping
    //!
    //! # Example: a list keyed by `name`
    //!
    //! ```
    //! use confpath::v1::*;
    //! use serde_json::json;
    //!
    //! let doc = json!({
    //!     "ietf-restconf:data": {
    //!         "interfaces": {
    //!             "interface": [
    //!                 {"name": "Gi0/0/1", "enabled": true},
    //!                 {"name": "lo0", "enabled": false}
    //!             ]
    //!         }
    //!     }
    //! });
    //!
    //! let nodes = build_document(&doc).unwrap();
    //! let list = &nodes[0].children()[0];
    //! assert_eq!(list.path(), "interfaces/interface");
    //! assert_eq!(list.children()[0].path(), "interfaces/interface=Gi0%2F0%2F1");
    //! assert_eq!(
    //!     list.children()[1].children()[1].path(),
    //!     "interfaces/interface=lo0/enabled"
    //! );
    //! ```

    /// Traversal and lookup over built trees.
    ///
    /// # Example: find the entries that cannot be selected
    ///
    /// ```
    /// use confpath::v1::{build_document, query};
    /// use serde_json::json;
    ///
    /// let nodes = build_document(&json!({
    ///     "user": [{"name": "a"}, {"name": "a"}, {"name": {"nested": 1}}]
    /// }))
    /// .unwrap();
    ///
    /// // Both "a" entries collide; the third has no scalar key.
    /// let bad = query::non_addressable(&nodes);
    /// assert_eq!(bad.len(), 3);
    /// assert_eq!(bad[2].path(), "user=%");
    /// assert_eq!(query::count(&nodes), 4);
    /// ```
    pub mod query {
        pub use crate::query::{
            Visit, all_paths, count, find, is_child_path, non_addressable, walk,
        };
    }
    pub use crate::encode::{decode, encode_list_path, escape, join, split_list_segment};
    pub use crate::error::{KeyResolutionError, TreeError};
    pub use crate::keys::{PREFERRED_KEY_FIELDS, resolve_key};
    pub use crate::normalize::{ENVELOPE_FIELD, normalize, normalize_owned};
    pub use crate::tree::{Shape, build, build_document};
    pub use crate::types::{
        Container, KeyField, Leaf, ListContainer, ListEntry, Node, Scalar, TreeEvent,
    };
}
