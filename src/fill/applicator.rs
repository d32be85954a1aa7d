use crate::dom::document::Document;
use crate::dom::node::{EventKind, NodeId};
use crate::scan::field_model::FieldKind;

// ============================================================================
// Type-correct value application
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Free-text kind: value assigned directly.
    Text,
    /// Enumerable kind: an option matched and was selected.
    OptionMatched(usize),
    /// Enumerable kind, no option matched: first option selected as the
    /// deterministic fallback.
    OptionFallback,
    /// Enumerable kind with no options at all; nothing to select.
    NoOptions,
    /// Target is not a fillable element; nothing was touched.
    NotAField,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, ApplyOutcome::NotAField)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyOutcome::Text => "text",
            ApplyOutcome::OptionMatched(_) => "option_matched",
            ApplyOutcome::OptionFallback => "option_fallback",
            ApplyOutcome::NoOptions => "no_options",
            ApplyOutcome::NotAField => "not_a_field",
        }
    }
}

/// Write a proposed value onto a live field with semantics matching its
/// kind, then notify listeners and flash the confirmation highlight.
///
/// Enumerable kinds take one pass over the options: a value matches an
/// option when it is a case-insensitive substring of the option's
/// display text, or equals the option's underlying value exactly
/// (case-insensitive). First match wins. With no match and at least one
/// option present, the first option is selected — a deliberate
/// heuristic, kept as-is. Every other kind takes the value as text.
///
/// The change notification is "change" for a selection and "input" for
/// text, so host listeners observe the kind of update they expect.
pub fn apply_value(doc: &mut Document, field: NodeId, value: &str, now_ms: u64) -> ApplyOutcome {
    let node = doc.node(field);
    if !node.is_field() {
        return ApplyOutcome::NotAField;
    }

    // Dispatch on the live element's kind, not the scan-time one; the
    // document may have drifted since the descriptor was built.
    let kind = FieldKind::from_declared(&node.tag, node.input_type());

    if kind.is_enumerable() {
        let target = value.to_lowercase();
        let (matched, has_options) = {
            let node = doc.node(field);
            let matched = node.options.iter().position(|opt| {
                opt.text.to_lowercase().contains(&target) || opt.value.to_lowercase() == target
            });
            (matched, !node.options.is_empty())
        };

        let outcome = match matched {
            Some(index) => {
                doc.select_option(field, index);
                ApplyOutcome::OptionMatched(index)
            }
            None if has_options => {
                doc.select_option(field, 0);
                ApplyOutcome::OptionFallback
            }
            None => ApplyOutcome::NoOptions,
        };

        doc.notify_value_changed(field, EventKind::Change);
        doc.flash(field, now_ms);
        outcome
    } else {
        doc.set_value(field, value);
        doc.notify_value_changed(field, EventKind::Input);
        doc.flash(field, now_ms);
        ApplyOutcome::Text
    }
}
