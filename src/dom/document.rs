use crate::dom::node::{EmittedEvent, EventKind, Node, NodeId, SelectOption};

/// Class applied by `flash` and removed once the highlight expires.
pub const HIGHLIGHT_CLASS: &str = "form-field-glow";
/// How long a fill highlight stays visible.
pub const HIGHLIGHT_MS: u64 = 200;

/// One batch of structural changes, in the order they happened. Attribute
/// and value writes are not journaled; only childList-style mutations are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationRecord {
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

#[derive(Debug)]
struct Highlight {
    node: NodeId,
    expires_at_ms: u64,
}

/// The mutable host document: an arena of nodes plus the page-level fields
/// the snapshot carries alongside the tree. All access happens from one
/// execution context; the document records mutations and change events for
/// the host to drain.
#[derive(Debug)]
pub struct Document {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    nodes: Vec<Node>,
    root: NodeId,
    mutations: Vec<MutationRecord>,
    events: Vec<EmittedEvent>,
    highlights: Vec<Highlight>,
}

impl Document {
    pub fn new(url: &str, title: &str, meta_description: &str) -> Self {
        let mut doc = Document {
            url: url.to_string(),
            title: title.to_string(),
            meta_description: meta_description.to_string(),
            nodes: Vec::new(),
            root: NodeId(0),
            mutations: Vec::new(),
            events: Vec::new(),
            highlights: Vec::new(),
        };
        doc.root = doc.push_node(Node::new("body"));
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Create a detached node. Attach it with `append_child` or the
    /// `insert_*` variants.
    pub fn create_node(&mut self, node: Node) -> NodeId {
        self.push_node(node)
    }

    // ------------------------------------------------------------------
    // Structural operations (journaled when they touch the attached tree)
    // ------------------------------------------------------------------

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none(), "child already attached");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        if self.is_connected(parent) {
            self.record_mutation(vec![child], vec![]);
        }
    }

    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        self.insert_relative(reference, child, 0);
    }

    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) {
        self.insert_relative(reference, child, 1);
    }

    fn insert_relative(&mut self, reference: NodeId, child: NodeId, offset: usize) {
        debug_assert!(self.nodes[child.0].parent.is_none(), "child already attached");
        let parent = match self.nodes[reference.0].parent {
            Some(p) => p,
            None => return,
        };
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .map(|p| p + offset)
            .unwrap_or(self.nodes[parent.0].children.len());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, child);
        if self.is_connected(parent) {
            self.record_mutation(vec![child], vec![]);
        }
    }

    /// Detach a subtree. The nodes stay in the arena (unattached) and may
    /// be re-attached later under the same ids.
    pub fn detach(&mut self, node: NodeId) {
        let parent = match self.nodes[node.0].parent {
            Some(p) => p,
            None => return,
        };
        let was_connected = self.is_connected(parent);
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
        if was_connected {
            self.record_mutation(vec![], vec![node]);
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    fn record_mutation(&mut self, added: Vec<NodeId>, removed: Vec<NodeId>) {
        self.mutations.push(MutationRecord { added, removed });
    }

    /// Drain the mutation journal. The overlay manager's pump feeds these
    /// batches to its observer.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    // ------------------------------------------------------------------
    // Traversal and queries
    // ------------------------------------------------------------------

    /// Attached nodes in document (preorder) order, root excluded.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[self.root.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Preorder walk of one subtree, including its root, regardless of
    /// whether the subtree is attached.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// All attached form fields in document order.
    pub fn fields(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.node(id).is_field())
            .collect()
    }

    /// Whether a node is itself a field or holds one anywhere below it.
    /// Works on detached subtrees, which is what removal batches carry.
    pub fn contains_field(&self, node: NodeId) -> bool {
        self.subtree(node)
            .into_iter()
            .any(|id| self.node(id).is_field())
    }

    /// Attached elements carrying `attr=value`, compared literally. No
    /// selector syntax is involved, so metacharacters in the value cannot
    /// change lookup semantics.
    pub fn find_by_attr(&self, attr: &str, value: &str) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.node(id).attr(attr) == Some(value))
            .collect()
    }

    pub fn find_by_id(&self, value: &str) -> Vec<NodeId> {
        self.find_by_attr("id", value)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Nearest ancestor (excluding the node itself) with the given tag.
    pub fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.nodes[node.0].parent;
        while let Some(id) = current {
            if self.node(id).tag == tag {
                return Some(id);
            }
            current = self.nodes[id.0].parent;
        }
        None
    }

    /// The sibling immediately before a node, if any.
    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings.iter().position(|&c| c == node)?;
        if pos == 0 { None } else { Some(siblings[pos - 1]) }
    }

    /// Concatenated text of a node and its descendants, whitespace-joined.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut parts = Vec::new();
        for id in self.subtree(node) {
            let text = self.node(id).text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
        parts.join(" ")
    }

    /// All h1 text joined by a space, the way the page context wants it.
    pub fn headings_text(&self) -> String {
        let mut parts = Vec::new();
        for id in self.preorder() {
            if self.node(id).tag == "h1" {
                let text = self.text_content(id);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
        parts.join(" ")
    }

    // ------------------------------------------------------------------
    // Value writes and change notification
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        self.nodes[node.0].value = value.to_string();
    }

    /// Select exactly one option by position, clearing the others.
    pub fn select_option(&mut self, node: NodeId, index: usize) {
        for (i, opt) in self.nodes[node.0].options.iter_mut().enumerate() {
            opt.selected = i == index;
        }
    }

    pub fn selected_option(&self, node: NodeId) -> Option<&SelectOption> {
        self.node(node).options.iter().find(|o| o.selected)
    }

    /// The host capability: record a change notification so host-page
    /// listeners observe the update.
    pub fn notify_value_changed(&mut self, node: NodeId, kind: EventKind) {
        self.events.push(EmittedEvent { node, kind });
    }

    pub fn events(&self) -> &[EmittedEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<EmittedEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attrs
            .insert(name.to_lowercase(), value.to_string());
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        self.nodes[node.0].attrs.remove(name);
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.node(node).has_class(class) {
            return;
        }
        let current = self.node(node).attr("class").unwrap_or("").to_string();
        let joined = if current.is_empty() {
            class.to_string()
        } else {
            format!("{} {}", current, class)
        };
        self.set_attr(node, "class", &joined);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        let remaining: Vec<&str> = self
            .node(node)
            .attr("class")
            .unwrap_or("")
            .split_whitespace()
            .filter(|p| *p != class)
            .collect();
        if remaining.is_empty() {
            self.remove_attr(node, "class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr(node, "class", &joined);
        }
    }

    // ------------------------------------------------------------------
    // Transient highlight
    // ------------------------------------------------------------------

    /// Tag a node with the glow class; it clears itself once expired.
    pub fn flash(&mut self, node: NodeId, now_ms: u64) {
        self.add_class(node, HIGHLIGHT_CLASS);
        self.highlights.push(Highlight {
            node,
            expires_at_ms: now_ms + HIGHLIGHT_MS,
        });
    }

    pub fn clear_expired_highlights(&mut self, now_ms: u64) {
        let expired: Vec<NodeId> = self
            .highlights
            .iter()
            .filter(|h| h.expires_at_ms <= now_ms)
            .map(|h| h.node)
            .collect();
        self.highlights.retain(|h| h.expires_at_ms > now_ms);
        for node in expired {
            // A newer flash on the same node keeps the class alive.
            if !self.highlights.iter().any(|h| h.node == node) {
                self.remove_class(node, HIGHLIGHT_CLASS);
            }
        }
    }

    pub fn is_highlighted(&self, node: NodeId) -> bool {
        self.node(node).has_class(HIGHLIGHT_CLASS)
    }
}
