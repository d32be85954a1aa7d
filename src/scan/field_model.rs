use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::node::NodeId;

// ============================================================================
// Field-level metadata captured at scan time
// ============================================================================

/// Classification of a field's declared kind. `Select` is the only
/// enumerable kind; everything else takes free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Date,
    Tel,
    Url,
    Checkbox,
    Radio,
    TextArea,
    Select,
    Other(String),
}

impl FieldKind {
    /// Derive the kind from a field's tag and declared type.
    pub fn from_declared(tag: &str, input_type: &str) -> FieldKind {
        match tag {
            "select" => return FieldKind::Select,
            "textarea" => return FieldKind::TextArea,
            _ => {}
        }
        match input_type {
            "" | "text" => FieldKind::Text,
            "email" => FieldKind::Email,
            "password" => FieldKind::Password,
            "number" => FieldKind::Number,
            "date" | "datetime-local" | "datetime" => FieldKind::Date,
            "tel" => FieldKind::Tel,
            "url" => FieldKind::Url,
            "checkbox" => FieldKind::Checkbox,
            "radio" => FieldKind::Radio,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn is_enumerable(&self) -> bool {
        matches!(self, FieldKind::Select)
    }

    /// Wire name used in the completion prompt, mirroring declared types.
    pub fn as_wire_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Tel => "tel",
            FieldKind::Url => "url",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::TextArea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Other(s) => s.as_str(),
        }
    }
}

/// Metadata record for one fillable element at scan time.
///
/// `index` is 1-based and sequential among eligible fields within one scan;
/// it is the correlation key for the completion round trip and is stable
/// only within that scan. `node` is where the field sat when scanned —
/// resolution at fill time never trusts it blindly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub index: usize,
    pub node: NodeId,
    pub kind: FieldKind,
    pub name: String,
    pub id: String,
    pub placeholder: String,
    pub aria_label: String,
    pub labels: Vec<String>,
    pub required: bool,
    pub pattern: Option<String>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub validation_message: Option<String>,
    pub options: Vec<String>,
    pub css_classes: Vec<String>,
    pub autocomplete: String,
}

/// Whether a trigger fills only currently empty fields or every eligible
/// one. One explicit flag shared by every trigger path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    #[default]
    OnlyEmpty,
    AllEligible,
}

// ============================================================================
// Page-level context grounding one completion request
// ============================================================================

/// Immutable page snapshot captured once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub title: String,
    pub url: String,
    pub meta_description: String,
    /// Concatenated h1 text, space-joined.
    pub headings: String,
}

impl PageContext {
    pub fn capture(doc: &Document) -> PageContext {
        PageContext {
            title: doc.title.clone(),
            url: doc.url.clone(),
            meta_description: doc.meta_description.clone(),
            headings: doc.headings_text(),
        }
    }
}
