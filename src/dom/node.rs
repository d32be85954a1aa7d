use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arena index of a node within one `Document`. Stable for the life of the
/// document; detached nodes keep their id and may be re-attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// One entry of a select element's option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

/// Change-notification kinds the hosting document dispatches after a value
/// write: `Input` for free text, `Change` for enumerable selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Input,
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
        }
    }
}

/// A change notification recorded by the document, observable by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub node: NodeId,
    pub kind: EventKind,
}

/// One element of the document tree. Tags and attribute names are
/// normalized to lowercase at construction.
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Own text content (not including descendants).
    pub text: String,
    /// Live value for input/textarea elements. Selects derive their value
    /// from the selected option instead.
    pub value: String,
    pub options: Vec<SelectOption>,
    /// Host-computed validity message, when the snapshot producer captured one.
    pub validation_message: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Node {
            tag: tag.to_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            options: Vec::new(),
            validation_message: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|s| s.as_str())
    }

    pub fn id_attr(&self) -> &str {
        self.attr("id").unwrap_or("")
    }

    pub fn name_attr(&self) -> &str {
        self.attr("name").unwrap_or("")
    }

    pub fn placeholder(&self) -> &str {
        self.attr("placeholder").unwrap_or("")
    }

    pub fn aria_label(&self) -> &str {
        self.attr("aria-label").unwrap_or("")
    }

    pub fn aria_labelledby(&self) -> Option<&str> {
        self.attr("aria-labelledby")
    }

    pub fn autocomplete(&self) -> &str {
        self.attr("autocomplete").unwrap_or("")
    }

    /// Declared type: the `type` attribute for inputs (default `text`),
    /// the tag itself for select/textarea.
    pub fn input_type(&self) -> &str {
        match self.tag.as_str() {
            "select" => "select",
            "textarea" => "textarea",
            _ => self.attr("type").unwrap_or("text"),
        }
    }

    /// Boolean attributes follow HTML semantics: presence means set.
    pub fn is_disabled(&self) -> bool {
        self.attrs.contains_key("disabled")
    }

    pub fn is_required(&self) -> bool {
        self.attrs.contains_key("required")
    }

    pub fn pattern(&self) -> Option<&str> {
        self.attr("pattern")
    }

    pub fn min_length(&self) -> Option<u32> {
        self.attr("minlength").and_then(|v| v.parse().ok())
    }

    pub fn max_length(&self) -> Option<u32> {
        self.attr("maxlength").and_then(|v| v.parse().ok())
    }

    pub fn css_classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|p| p == class))
    }

    /// Whether this node is an input-capable form field.
    pub fn is_field(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    /// The field's current value: selects report the selected option's
    /// underlying value, everything else the live `value`.
    pub fn current_value(&self) -> &str {
        if self.tag == "select" {
            self.options
                .iter()
                .find(|o| o.selected)
                .map(|o| o.value.as_str())
                .unwrap_or("")
        } else {
            self.value.as_str()
        }
    }
}
