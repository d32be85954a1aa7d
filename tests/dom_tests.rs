use form_autofill::dom::document::{Document, HIGHLIGHT_CLASS, HIGHLIGHT_MS};
use form_autofill::dom::node::{EventKind, Node};

mod common;
use common::{attach, input, select, text_node};

// ============================================================================
// Snapshot loading
// ============================================================================

const SNAPSHOT_JSON: &str = r#"{
  "url": "https://app.example.com/checkout",
  "title": "Checkout",
  "metaDescription": "Finish your order",
  "body": {
    "tag": "BODY",
    "children": [
      { "tag": "h1", "text": "Checkout" },
      {
        "tag": "form",
        "children": [
          {
            "tag": "INPUT",
            "attrs": { "TYPE": "email", "id": "email", "name": "email" }
          },
          {
            "tag": "select",
            "attrs": { "id": "shipping", "name": "shipping" },
            "options": [
              { "value": "std", "text": "Standard", "selected": true },
              { "value": "exp", "text": "Express" }
            ]
          },
          {
            "tag": "input",
            "attrs": { "id": "notes", "name": "notes" },
            "validationMessage": "Please fill out this field."
          }
        ]
      }
    ]
  }
}"#;

#[test]
fn from_json_materializes_the_tree() {
    let doc = Document::from_json(SNAPSHOT_JSON).expect("snapshot should parse");

    assert_eq!(doc.url, "https://app.example.com/checkout");
    assert_eq!(doc.title, "Checkout");
    assert_eq!(doc.meta_description, "Finish your order");

    let fields = doc.fields();
    assert_eq!(fields.len(), 3, "email, shipping, notes");

    // Tags and attribute names are normalized to lowercase.
    let email = doc.find_by_id("email")[0];
    assert_eq!(doc.node(email).tag, "input");
    assert_eq!(doc.node(email).input_type(), "email");

    let notes = doc.find_by_id("notes")[0];
    assert_eq!(
        doc.node(notes).validation_message.as_deref(),
        Some("Please fill out this field.")
    );
}

#[test]
fn loading_does_not_journal_mutations() {
    let mut doc = Document::from_json(SNAPSHOT_JSON).unwrap();
    assert!(doc.take_mutations().is_empty());
}

#[test]
fn to_json_reparses_to_the_same_page() {
    let doc = Document::from_json(SNAPSHOT_JSON).unwrap();
    let reparsed = Document::from_json(&doc.to_json()).unwrap();

    assert_eq!(reparsed.title, doc.title);
    assert_eq!(reparsed.fields().len(), doc.fields().len());
    let shipping = reparsed.find_by_id("shipping")[0];
    assert_eq!(
        reparsed.selected_option(shipping).map(|o| o.text.as_str()),
        Some("Standard")
    );
}

#[test]
fn from_json_rejects_garbage() {
    let err = Document::from_json("not a snapshot").unwrap_err();
    assert!(err.to_string().contains("Snapshot parse error"));
}

// ============================================================================
// Structural mutations and the journal
// ============================================================================

#[test]
fn append_to_connected_parent_is_journaled() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();

    attach(&mut doc, root, input("text", "a", "a"));

    let records = doc.take_mutations();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].added.len(), 1);
    assert!(records[0].removed.is_empty());
}

#[test]
fn building_a_detached_subtree_is_silent_until_attach() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();

    let wrapper = doc.create_node(Node::new("div"));
    let field = doc.create_node(input("text", "inner", "inner"));
    doc.append_child(wrapper, field);
    assert!(doc.take_mutations().is_empty(), "detached appends are not observed");

    doc.append_child(root, wrapper);
    let records = doc.take_mutations();
    assert_eq!(records.len(), 1, "one record for the whole subtree");
    assert_eq!(records[0].added, vec![wrapper]);
    assert!(doc.is_connected(field));
}

#[test]
fn detach_journals_one_removal_and_keeps_the_arena_entry() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let wrapper = attach(&mut doc, root, Node::new("div"));
    let field = attach(&mut doc, wrapper, input("text", "x", "x"));
    doc.take_mutations();

    doc.detach(wrapper);

    let records = doc.take_mutations();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].removed, vec![wrapper]);
    assert!(!doc.is_connected(field));
    // The subtree survives detached and can be queried through its handle.
    assert_eq!(doc.node(field).id_attr(), "x");
    assert!(doc.fields().is_empty());
}

#[test]
fn insert_before_and_after_order_siblings() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let middle = attach(&mut doc, root, text_node("p", "middle"));

    let first = doc.create_node(text_node("p", "first"));
    doc.insert_before(middle, first);
    let last = doc.create_node(text_node("p", "last"));
    doc.insert_after(middle, last);

    assert_eq!(doc.children(root), &[first, middle, last]);
    assert_eq!(doc.previous_sibling(middle), Some(first));
    assert_eq!(doc.previous_sibling(first), None);
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn find_by_attr_matches_literally() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let odd = attach(&mut doc, root, input("text", r#"a"b]"#, ""));
    attach(&mut doc, root, input("text", "plain", ""));

    // Metacharacters are just characters; no selector syntax is parsed.
    assert_eq!(doc.find_by_id(r#"a"b]"#), vec![odd]);
    assert!(doc.find_by_id(r#"a"b"#).is_empty());
}

#[test]
fn preorder_walks_document_order() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let a = attach(&mut doc, root, Node::new("div"));
    let b = attach(&mut doc, a, text_node("span", "b"));
    let c = attach(&mut doc, a, input("text", "c", ""));
    let d = attach(&mut doc, root, Node::new("div"));

    assert_eq!(doc.preorder(), vec![a, b, c, d]);
    assert_eq!(doc.fields(), vec![c]);
    assert!(doc.contains_field(a));
    assert!(!doc.contains_field(d));
}

#[test]
fn closest_finds_the_nearest_ancestor_only() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let form = attach(&mut doc, root, Node::new("form"));
    let label = attach(&mut doc, form, Node::new("label"));
    let field = attach(&mut doc, label, input("checkbox", "opt", ""));

    assert_eq!(doc.closest(field, "label"), Some(label));
    assert_eq!(doc.closest(field, "form"), Some(form));
    assert_eq!(doc.closest(field, "section"), None);
    // A node is not its own ancestor.
    assert_eq!(doc.closest(label, "label"), None);
}

#[test]
fn text_content_joins_descendant_text() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let label = attach(&mut doc, root, text_node("label", "Email"));
    attach(&mut doc, label, text_node("span", "(required)"));

    assert_eq!(doc.text_content(label), "Email (required)");
}

#[test]
fn headings_text_joins_h1_only() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    attach(&mut doc, root, text_node("h1", "Welcome"));
    attach(&mut doc, root, text_node("h2", "Subsection"));
    attach(&mut doc, root, text_node("h1", "Back"));

    assert_eq!(doc.headings_text(), "Welcome Back");
}

// ============================================================================
// Values, events, classes
// ============================================================================

#[test]
fn select_current_value_comes_from_the_selected_option() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let dropdown = attach(
        &mut doc,
        root,
        select("size", "size", &[("s", "Small"), ("l", "Large")]),
    );

    assert_eq!(doc.node(dropdown).current_value(), "");
    doc.select_option(dropdown, 1);
    assert_eq!(doc.node(dropdown).current_value(), "l");
    assert_eq!(
        doc.selected_option(dropdown).map(|o| o.text.as_str()),
        Some("Large")
    );

    // Re-selecting clears the previous choice.
    doc.select_option(dropdown, 0);
    assert_eq!(doc.node(dropdown).current_value(), "s");
}

#[test]
fn emitted_events_accumulate_until_drained() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let field = attach(&mut doc, root, input("text", "f", ""));

    doc.set_value(field, "hello");
    doc.notify_value_changed(field, EventKind::Input);
    doc.notify_value_changed(field, EventKind::Change);

    assert_eq!(doc.events().len(), 2);
    assert_eq!(doc.events()[0].kind, EventKind::Input);

    let drained = doc.take_events();
    assert_eq!(drained.len(), 2);
    assert!(doc.events().is_empty());
}

#[test]
fn class_list_handling_is_token_exact() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let field = attach(&mut doc, root, input("text", "f", ""));

    doc.add_class(field, "autofill-trigger");
    doc.add_class(field, "autofill-trigger");
    assert_eq!(doc.node(field).attr("class"), Some("autofill-trigger"));

    assert!(doc.node(field).has_class("autofill-trigger"));
    assert!(!doc.node(field).has_class("trigger"), "no substring matching");

    doc.add_class(field, "loading");
    doc.remove_class(field, "autofill-trigger");
    assert_eq!(doc.node(field).attr("class"), Some("loading"));

    doc.remove_class(field, "loading");
    assert_eq!(doc.node(field).attr("class"), None);
}

#[test]
fn flash_expires_after_the_highlight_window() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let field = attach(&mut doc, root, input("text", "f", ""));

    doc.flash(field, 1_000);
    assert!(doc.is_highlighted(field));

    doc.clear_expired_highlights(1_000 + HIGHLIGHT_MS - 1);
    assert!(doc.is_highlighted(field), "still inside the window");

    doc.clear_expired_highlights(1_000 + HIGHLIGHT_MS);
    assert!(!doc.is_highlighted(field));
    assert!(!doc.node(field).has_class(HIGHLIGHT_CLASS));
}

#[test]
fn a_newer_flash_outlives_an_older_expiry() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let field = attach(&mut doc, root, input("text", "f", ""));

    doc.flash(field, 1_000);
    doc.flash(field, 1_100);

    doc.clear_expired_highlights(1_200);
    assert!(doc.is_highlighted(field), "second flash runs to 1300");

    doc.clear_expired_highlights(1_300);
    assert!(!doc.is_highlighted(field));
}
