use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::scan::field_model::{FieldDescriptor, FieldKind, FillMode};

// ============================================================================
// Eligibility
// ============================================================================

/// The exclusion filters every trigger path shares: attached, input-capable,
/// not hidden, not disabled, not password/search-like. Value emptiness is a
/// mode on top of this, not part of eligibility itself.
pub fn is_base_eligible(doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);
    if !node.is_field() || !doc.is_connected(id) {
        return false;
    }
    if node.input_type() == "hidden" || node.is_disabled() {
        return false;
    }
    !is_password_or_search_like(doc, id)
}

pub fn is_eligible(doc: &Document, id: NodeId, mode: FillMode) -> bool {
    if !is_base_eligible(doc, id) {
        return false;
    }
    match mode {
        FillMode::OnlyEmpty => doc.node(id).current_value().trim().is_empty(),
        FillMode::AllEligible => true,
    }
}

/// Password and search fields are never scanned or filled: declared kind,
/// or a case-insensitive "search" substring in name, id, or placeholder.
fn is_password_or_search_like(doc: &Document, id: NodeId) -> bool {
    let node = doc.node(id);
    let declared = node.input_type();
    if declared == "password" || declared == "search" {
        return true;
    }
    [node.name_attr(), node.id_attr(), node.placeholder()]
        .iter()
        .any(|v| v.to_lowercase().contains("search"))
}

/// Fields passing the base filters, in document order. This is the ordering
/// the resolver's positional fallback counts against.
pub fn base_eligible_fields(doc: &Document) -> Vec<NodeId> {
    doc.fields()
        .into_iter()
        .filter(|&id| is_base_eligible(doc, id))
        .collect()
}

pub fn eligible_fields(doc: &Document, mode: FillMode) -> Vec<NodeId> {
    doc.fields()
        .into_iter()
        .filter(|&id| is_eligible(doc, id, mode))
        .collect()
}

// ============================================================================
// Label inference
// ============================================================================

/// Text siblings only count as labels when they stay short.
const MAX_SIBLING_LABEL_LEN: usize = 200;

/// Gather every non-empty label candidate for a field, without picking a
/// winner: explicit `label[for]`, enclosing label, `aria-labelledby`
/// references, a preceding short text/heading sibling, and the enclosing
/// fieldset's legend. Order is readability only; duplicates are dropped.
pub fn infer_labels(doc: &Document, field: NodeId) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    let mut push = |labels: &mut Vec<String>, text: String| {
        let text = text.trim().to_string();
        if !text.is_empty() && !labels.contains(&text) {
            labels.push(text);
        }
    };

    // 1) Explicit label with a matching `for` attribute
    let field_id = doc.node(field).id_attr().to_string();
    if !field_id.is_empty() {
        let linked = doc
            .preorder()
            .into_iter()
            .find(|&id| doc.node(id).tag == "label" && doc.node(id).attr("for") == Some(&field_id));
        if let Some(label) = linked {
            push(&mut labels, doc.text_content(label));
        }
    }

    // 2) Enclosing label ancestor
    if let Some(ancestor) = doc.closest(field, "label") {
        push(&mut labels, doc.text_content(ancestor));
    }

    // 3) aria-labelledby references
    if let Some(refs) = doc.node(field).aria_labelledby() {
        let ids: Vec<String> = refs.split_whitespace().map(str::to_string).collect();
        for referenced in ids {
            if let Some(&target) = doc.find_by_id(&referenced).first() {
                push(&mut labels, doc.text_content(target));
            }
        }
    }

    // 4) Adjacent preceding short text or heading sibling
    if let Some(prev) = doc.previous_sibling(field) {
        if is_text_or_heading(&doc.node(prev).tag) {
            let text = doc.text_content(prev);
            if text.len() <= MAX_SIBLING_LABEL_LEN {
                push(&mut labels, text);
            }
        }
    }

    // 5) Enclosing fieldset's legend
    if let Some(fieldset) = doc.closest(field, "fieldset") {
        let legend = doc
            .subtree(fieldset)
            .into_iter()
            .find(|&id| doc.node(id).tag == "legend");
        if let Some(legend) = legend {
            push(&mut labels, doc.text_content(legend));
        }
    }

    labels
}

fn is_text_or_heading(tag: &str) -> bool {
    matches!(tag, "span" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

// ============================================================================
// Scan
// ============================================================================

/// Produce the ordered descriptor list for one scan. Indices are 1-based
/// and assigned only to eligible fields, in document order. An empty list
/// means there is nothing to do and no request should be issued.
pub fn scan(doc: &Document, mode: FillMode) -> Vec<FieldDescriptor> {
    let mut descriptors = Vec::new();
    let mut index = 0;

    for field in doc.fields() {
        if !is_eligible(doc, field, mode) {
            continue;
        }
        index += 1;
        descriptors.push(describe_field(doc, field, index));
    }

    descriptors
}

fn describe_field(doc: &Document, field: NodeId, index: usize) -> FieldDescriptor {
    let node = doc.node(field);
    let kind = FieldKind::from_declared(&node.tag, node.input_type());
    let options = if kind.is_enumerable() {
        node.options
            .iter()
            .map(|o| o.text.trim().to_string())
            .collect()
    } else {
        Vec::new()
    };

    FieldDescriptor {
        index,
        node: field,
        name: node.name_attr().to_string(),
        id: node.id_attr().to_string(),
        placeholder: node.placeholder().to_string(),
        aria_label: node.aria_label().to_string(),
        labels: infer_labels(doc, field),
        required: node.is_required(),
        pattern: node.pattern().map(str::to_string),
        min_length: node.min_length(),
        max_length: node.max_length(),
        validation_message: node.validation_message.clone(),
        options,
        css_classes: node.css_classes(),
        autocomplete: node.autocomplete().to_string(),
        kind,
    }
}
