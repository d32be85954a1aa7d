use form_autofill::dom::document::Document;
use form_autofill::dom::node::{Node, NodeId, SelectOption};

// ============================================================================
// Node builders
// ============================================================================

pub fn input(input_type: &str, id: &str, name: &str) -> Node {
    let mut node = Node::new("input");
    if !input_type.is_empty() {
        node.attrs.insert("type".to_string(), input_type.to_string());
    }
    if !id.is_empty() {
        node.attrs.insert("id".to_string(), id.to_string());
    }
    if !name.is_empty() {
        node.attrs.insert("name".to_string(), name.to_string());
    }
    node
}

/// A select element with (value, text) option pairs, none selected.
pub fn select(id: &str, name: &str, options: &[(&str, &str)]) -> Node {
    let mut node = Node::new("select");
    if !id.is_empty() {
        node.attrs.insert("id".to_string(), id.to_string());
    }
    if !name.is_empty() {
        node.attrs.insert("name".to_string(), name.to_string());
    }
    node.options = options
        .iter()
        .map(|(value, text)| SelectOption {
            value: value.to_string(),
            text: text.to_string(),
            selected: false,
        })
        .collect();
    node
}

pub fn label_for(target: &str, text: &str) -> Node {
    let mut node = Node::new("label");
    node.attrs.insert("for".to_string(), target.to_string());
    node.text = text.to_string();
    node
}

pub fn text_node(tag: &str, text: &str) -> Node {
    let mut node = Node::new(tag);
    node.text = text.to_string();
    node
}

pub fn attach(doc: &mut Document, parent: NodeId, node: Node) -> NodeId {
    let id = doc.create_node(node);
    doc.append_child(parent, id);
    id
}

// ============================================================================
// Canonical fixture: a small signup page
// ============================================================================

/// Node handles into the signup fixture, so tests can poke at specific
/// elements without re-querying.
pub struct SignupPage {
    pub doc: Document,
    pub form: NodeId,
    pub email: NodeId,
    pub phone: NodeId,
    pub country: NodeId,
}

/// body > h1 + form(label/input email, label/input phone, label/select
/// country). All three fields start empty, so under `only_empty` the
/// scan sees email=1, phone=2, country=3.
pub fn signup_page() -> SignupPage {
    let mut doc = Document::new(
        "https://shop.example.com/signup",
        "Create Account",
        "Sign up for an account",
    );
    let root = doc.root();

    attach(&mut doc, root, text_node("h1", "Create your account"));
    let form = attach(&mut doc, root, Node::new("form"));

    attach(&mut doc, form, label_for("email", "Email Address"));
    let email = attach(&mut doc, form, input("email", "email", "email"));

    attach(&mut doc, form, label_for("phone", "Phone Number"));
    let phone = attach(&mut doc, form, input("tel", "phone", "phone"));

    attach(&mut doc, form, label_for("country", "Country"));
    let country = attach(
        &mut doc,
        form,
        select(
            "country",
            "country",
            &[
                ("", "Select a country"),
                ("CA", "Canada"),
                ("US", "United States"),
            ],
        ),
    );

    // Building the fixture is page load, not a mutation the host saw.
    doc.take_mutations();

    SignupPage {
        doc,
        form,
        email,
        phone,
        country,
    }
}
