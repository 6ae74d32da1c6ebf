use anyhow::{Context, Result};
use confpath::v1::{Node, query};
use confpath_restconf::{ClientConfig, Explorer, HttpTransport};
use serde_json::Value;
use std::fmt::Write;
use std::path::Path;

pub async fn run(config: &ClientConfig, input: Option<&Path>, json: bool, pretty: bool) -> Result<()> {
    let mut explorer = Explorer::new();

    match input {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", path))?;
            explorer
                .load_value(&value)
                .with_context(|| format!("Failed to build tree from {:?}", path))?;
        }
        None => {
            let transport = HttpTransport::new(config.clone())?;
            explorer
                .load_root(&transport)
                .await
                .with_context(|| format!("Failed to load {}", config.data_url("")))?;
        }
    }

    let nodes = explorer.nodes();
    if json {
        let out = if pretty {
            serde_json::to_string_pretty(nodes)?
        } else {
            serde_json::to_string(nodes)?
        };
        println!("{}", out);
    } else {
        print!("{}", render_outline(nodes));
    }
    Ok(())
}

/// One line per node, indented by depth: the node label, its value for
/// leaves, and its address. Members that cannot be selected are marked `!`
/// with the reason.
pub fn render_outline(nodes: &[Node]) -> String {
    let mut out = String::new();
    for visit in query::walk(nodes) {
        let indent = "  ".repeat(visit.depth);
        let mut label = visit.node.label();
        if let Node::Leaf(leaf) = visit.node {
            match &leaf.value {
                Some(value) => {
                    let _ = write!(label, " = {}", value);
                }
                None => label.push_str(" = null"),
            }
        }
        let _ = write!(out, "{}{}  {}", indent, label, visit.node.path());

        if !visit.node.is_addressable() {
            match visit.node.key_error() {
                Some(e) => {
                    let _ = write!(out, "  ! {}", e);
                }
                None => out.push_str("  !"),
            }
        }
        out.push('\n');
    }
    out
}
