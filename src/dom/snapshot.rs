use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::node::{Node, NodeId, SelectOption};
use crate::error::FillError;

/// On-disk document snapshot: page-level fields alongside the body tree,
/// the same shape the extraction bridge emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "metaDescription")]
    pub meta_description: String,
    pub body: NodeSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(
        default,
        rename = "validationMessage",
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl Document {
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Document {
        let mut doc = Document::new(&snapshot.url, &snapshot.title, &snapshot.meta_description);
        let root = doc.root();
        // The snapshot's body node becomes the document root; only its
        // children are materialized.
        for child in &snapshot.body.children {
            build_node(&mut doc, root, child);
        }
        // Loading is not a mutation the host observed.
        doc.take_mutations();
        doc
    }

    pub fn from_json(json: &str) -> Result<Document, FillError> {
        let snapshot: DocumentSnapshot =
            serde_json::from_str(json).map_err(|e| FillError::SnapshotParse {
                context: "document snapshot".into(),
                source: e,
            })?;
        Ok(Document::from_snapshot(&snapshot))
    }

    pub fn load(path: &str) -> Result<Document, FillError> {
        let content = std::fs::read_to_string(path).map_err(|e| FillError::SnapshotIo {
            path: path.to_string(),
            source: e,
        })?;
        Document::from_json(&content)
    }

    pub fn to_snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            url: self.url.clone(),
            title: self.title.clone(),
            meta_description: self.meta_description.clone(),
            body: self.node_snapshot(self.root()),
        }
    }

    pub fn to_json(&self) -> String {
        // Serialization of our own snapshot types does not fail.
        serde_json::to_string_pretty(&self.to_snapshot()).unwrap_or_default()
    }

    fn node_snapshot(&self, id: NodeId) -> NodeSnapshot {
        let node = self.node(id);
        NodeSnapshot {
            tag: node.tag.clone(),
            attrs: node.attrs.clone(),
            text: node.text.clone(),
            value: node.value.clone(),
            options: node.options.clone(),
            validation_message: node.validation_message.clone(),
            children: self
                .children(id)
                .iter()
                .map(|&c| self.node_snapshot(c))
                .collect(),
        }
    }

    /// Materialize a snapshot subtree under an existing parent. The
    /// subtree is assembled detached and attached in one step, so the
    /// journal records a single insertion, the way a host batches one.
    pub fn insert_snapshot(&mut self, parent: NodeId, snapshot: &NodeSnapshot) -> NodeId {
        let top = self.create_node(materialize(snapshot));
        for child in &snapshot.children {
            build_node(self, top, child);
        }
        self.append_child(parent, top);
        top
    }
}

fn materialize(snapshot: &NodeSnapshot) -> Node {
    let mut node = Node::new(&snapshot.tag);
    node.attrs = snapshot
        .attrs
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.clone()))
        .collect();
    node.text = snapshot.text.clone();
    node.value = snapshot.value.clone();
    node.options = snapshot.options.clone();
    node.validation_message = snapshot.validation_message.clone();
    node
}

fn build_node(doc: &mut Document, parent: NodeId, snapshot: &NodeSnapshot) {
    let id = doc.create_node(materialize(snapshot));
    doc.append_child(parent, id);
    for child in &snapshot.children {
        build_node(doc, id, child);
    }
}
