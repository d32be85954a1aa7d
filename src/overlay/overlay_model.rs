use serde::Serialize;

use crate::dom::document::Document;
use crate::dom::node::NodeId;

/// Attribute marking an affordance element; the value is the field
/// fingerprint it was created for.
pub const TRIGGER_ATTR: &str = "data-autofill-trigger";

/// Attribute marking a container that currently holds an affordance.
pub const GROUP_ATTR: &str = "data-autofill-group";

pub const TRIGGER_CLASS: &str = "autofill-trigger";
pub const LOADING_CLASS: &str = "loading";

/// Coalescing window for mutation-driven resynchronization.
pub const SYNC_DEBOUNCE_MS: u64 = 400;

/// Clicks on a loading affordance are ignored; `absent` is represented
/// by the affordance not existing at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffordanceState {
    Idle,
    Loading,
}

/// One field, one trigger button, tied together for the lifetime of the
/// current synchronization generation.
#[derive(Debug, Clone)]
pub struct Affordance {
    pub field: NodeId,
    pub button: NodeId,
    pub fingerprint: String,
    pub state: AffordanceState,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OverlayStats {
    pub passes_run: usize,
    pub requests_dropped: usize,
    pub affordances: usize,
}

/// Identity material for an affordance marker: tag, identifying
/// attributes, and the field's position among all fields.
pub fn field_fingerprint(doc: &Document, field: NodeId) -> String {
    use sha1::{Digest, Sha1};

    let node = doc.node(field);
    let position = doc.fields().iter().position(|&f| f == field).unwrap_or(0);
    let material = format!(
        "{}::{}::{}::{}::{}",
        node.tag,
        node.id_attr(),
        node.name_attr(),
        node.placeholder(),
        position
    );

    let mut hasher = Sha1::new();
    hasher.update(material.as_bytes());
    format!("{:x}", hasher.finalize())
}
