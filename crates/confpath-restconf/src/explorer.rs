//! The browsable tree of the datastore and the selection events it emits.

use crate::error::{ConsoleError, Result};
use crate::transport::Transport;
use confpath::v1::{Node, TreeEvent, build_document, query};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Holds the tree built from the last root load.
///
/// The tree is rebuilt from scratch on every load; a failed load leaves it
/// empty with the cause available from [`Explorer::last_error`].
#[derive(Debug, Default)]
pub struct Explorer {
    nodes: Vec<Node>,
    last_error: Option<String>,
    events: Option<mpsc::UnboundedSender<TreeEvent>>,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send [`TreeEvent`]s for accepted selections to `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<TreeEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the datastore root and rebuild the tree.
    ///
    /// Returns the number of top-level nodes.
    pub async fn load_root<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<usize> {
        self.nodes.clear();
        self.last_error = None;

        let loaded = match transport.get("").await {
            Ok(value) => self.load_value(&value),
            Err(e) => Err(e),
        };
        if let Err(e) = &loaded {
            warn!("Failed to load RESTCONF root: {}", e);
            self.last_error = Some(format!("Failed to load RESTCONF root: {}", e));
        }
        loaded
    }

    /// Rebuild the tree from an already fetched document.
    pub fn load_value(&mut self, value: &Value) -> Result<usize> {
        self.nodes.clear();
        self.nodes = build_document(value)?;

        for node in query::non_addressable(&self.nodes) {
            if let Some(e) = node.key_error() {
                debug!(path = %node.path(), "list member not addressable: {}", e);
            }
        }
        Ok(self.nodes.len())
    }

    /// Select the node at `path`.
    ///
    /// Unknown paths and non-addressable list members are refused. Accepted
    /// selections are also sent to the subscribed channel, if any.
    pub fn select(&self, path: &str) -> Result<TreeEvent> {
        let node =
            query::find(&self.nodes, path).ok_or_else(|| ConsoleError::UnknownPath(path.into()))?;

        if !node.is_addressable() {
            let reason = node
                .key_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "key could not be resolved".to_string());
            return Err(ConsoleError::NotAddressable {
                path: path.to_string(),
                reason,
            });
        }

        let event = TreeEvent::PathSelected(node.path().to_string());
        if let Some(tx) = &self.events
            && tx.send(event.clone()).is_err()
        {
            debug!("selection receiver dropped");
        }
        Ok(event)
    }
}
