use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::scan::extractor::base_eligible_fields;
use crate::scan::field_model::FieldDescriptor;

// ============================================================================
// Stale-descriptor recovery
// ============================================================================

/// Which strategy relocated a field, in precedence order. Positional
/// resolution is the least trustworthy and worth distinguishing in
/// traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    Id,
    Name,
    Attributes,
    Position,
}

impl ResolveStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveStrategy::Id => "id",
            ResolveStrategy::Name => "name",
            ResolveStrategy::Attributes => "attributes",
            ResolveStrategy::Position => "position",
        }
    }
}

/// Relocate a descriptor's field in the document as it stands now,
/// which may have drifted since the scan. Strict precedence, first
/// match wins:
///
/// 1. id lookup, when the id is non-empty and names exactly one element
/// 2. name lookup, same uniqueness rule
/// 3. attribute similarity over eligible fields, only if exactly one
///    candidate survives
/// 4. the Nth eligible field in current document order, N = the
///    descriptor's scan index
///
/// Identifiers and names are the most stable anchors; attribute
/// similarity recovers renamed-but-otherwise-identical fields; position
/// guarantees termination at the cost of precision. None means every
/// strategy missed; the caller skips the field and moves on.
pub fn resolve(doc: &Document, descriptor: &FieldDescriptor) -> Option<(NodeId, ResolveStrategy)> {
    if !descriptor.id.is_empty() {
        if let Some(node) = unique_field_by_attr(doc, "id", &descriptor.id) {
            return Some((node, ResolveStrategy::Id));
        }
    }

    if !descriptor.name.is_empty() {
        if let Some(node) = unique_field_by_attr(doc, "name", &descriptor.name) {
            return Some((node, ResolveStrategy::Name));
        }
    }

    let eligible = base_eligible_fields(doc);

    let similar: Vec<NodeId> = eligible
        .iter()
        .copied()
        .filter(|&id| attributes_match(doc, id, descriptor))
        .collect();
    if let [only] = similar.as_slice() {
        return Some((*only, ResolveStrategy::Attributes));
    }

    if descriptor.index >= 1 {
        if let Some(&node) = eligible.get(descriptor.index - 1) {
            return Some((node, ResolveStrategy::Position));
        }
    }

    None
}

/// Exactly one element may carry the attribute value, and it must be
/// fillable. Ambiguous matches fall through to the next strategy.
fn unique_field_by_attr(doc: &Document, attr: &str, value: &str) -> Option<NodeId> {
    match doc.find_by_attr(attr, value).as_slice() {
        [only] if doc.node(*only).is_field() => Some(*only),
        _ => None,
    }
}

/// A candidate matches when its id, name, or placeholder equals the
/// descriptor's, comparing only attributes the descriptor actually has.
fn attributes_match(doc: &Document, id: NodeId, descriptor: &FieldDescriptor) -> bool {
    let node = doc.node(id);
    (!descriptor.id.is_empty() && node.id_attr() == descriptor.id)
        || (!descriptor.name.is_empty() && node.name_attr() == descriptor.name)
        || (!descriptor.placeholder.is_empty() && node.placeholder() == descriptor.placeholder)
}
