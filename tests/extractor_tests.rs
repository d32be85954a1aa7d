use form_autofill::dom::document::Document;
use form_autofill::dom::node::Node;
use form_autofill::scan::extractor::{
    base_eligible_fields, eligible_fields, infer_labels, is_base_eligible, is_eligible, scan,
};
use form_autofill::scan::field_model::{FieldKind, FillMode, PageContext};

mod common;
use common::{attach, input, label_for, select, signup_page, text_node};

// ============================================================================
// Eligibility
// ============================================================================

#[test]
fn hidden_disabled_and_password_fields_are_excluded() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();

    let visible = attach(&mut doc, root, input("text", "ok", "ok"));
    let hidden = attach(&mut doc, root, input("hidden", "csrf", "csrf"));
    let password = attach(&mut doc, root, input("password", "pw", "pw"));
    let disabled = {
        let mut node = input("text", "frozen", "frozen");
        node.attrs.insert("disabled".to_string(), String::new());
        attach(&mut doc, root, node)
    };

    assert!(is_base_eligible(&doc, visible));
    assert!(!is_base_eligible(&doc, hidden));
    assert!(!is_base_eligible(&doc, password));
    assert!(!is_base_eligible(&doc, disabled));
    assert_eq!(base_eligible_fields(&doc), vec![visible]);
}

#[test]
fn search_like_fields_are_excluded_by_type_or_text() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();

    let declared = attach(&mut doc, root, input("search", "q", "q"));
    let by_name = attach(&mut doc, root, input("text", "", "SearchQuery"));
    let by_placeholder = {
        let mut node = input("text", "finder", "");
        node.attrs
            .insert("placeholder".to_string(), "Search products...".to_string());
        attach(&mut doc, root, node)
    };
    let plain = attach(&mut doc, root, input("text", "city", "city"));

    assert!(!is_base_eligible(&doc, declared));
    assert!(!is_base_eligible(&doc, by_name), "name match is case-insensitive");
    assert!(!is_base_eligible(&doc, by_placeholder));
    assert!(is_base_eligible(&doc, plain));
}

#[test]
fn detached_fields_never_scan() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let field = attach(&mut doc, root, input("text", "x", "x"));

    assert_eq!(eligible_fields(&doc, FillMode::OnlyEmpty), vec![field]);
    doc.detach(field);
    assert!(eligible_fields(&doc, FillMode::OnlyEmpty).is_empty());
}

#[test]
fn only_empty_mode_skips_prefilled_values() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let filled = attach(&mut doc, root, input("text", "a", "a"));
    doc.set_value(filled, "already here");
    let blank = attach(&mut doc, root, input("text", "b", "b"));
    let whitespace = attach(&mut doc, root, input("text", "c", "c"));
    doc.set_value(whitespace, "   ");

    assert!(!is_eligible(&doc, filled, FillMode::OnlyEmpty));
    assert!(is_eligible(&doc, blank, FillMode::OnlyEmpty));
    assert!(
        is_eligible(&doc, whitespace, FillMode::OnlyEmpty),
        "whitespace counts as empty"
    );

    assert_eq!(
        eligible_fields(&doc, FillMode::AllEligible),
        vec![filled, blank, whitespace]
    );
}

#[test]
fn select_emptiness_follows_the_selected_option_value() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let dropdown = attach(
        &mut doc,
        root,
        select(
            "country",
            "country",
            &[("", "Select a country"), ("CA", "Canada")],
        ),
    );

    // Nothing selected: empty.
    assert!(is_eligible(&doc, dropdown, FillMode::OnlyEmpty));

    // A placeholder option with an empty value is still empty.
    doc.select_option(dropdown, 0);
    assert!(is_eligible(&doc, dropdown, FillMode::OnlyEmpty));

    doc.select_option(dropdown, 1);
    assert!(!is_eligible(&doc, dropdown, FillMode::OnlyEmpty));
}

// ============================================================================
// Scan ordering and descriptors
// ============================================================================

#[test]
fn scan_indexes_eligible_fields_sequentially() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    attach(&mut doc, root, input("text", "first", "first"));
    attach(&mut doc, root, input("password", "pw", "pw"));
    attach(&mut doc, root, input("text", "second", "second"));

    let descriptors = scan(&doc, FillMode::OnlyEmpty);
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].index, 1);
    assert_eq!(descriptors[0].id, "first");
    assert_eq!(
        descriptors[1].index, 2,
        "indices stay sequential across the excluded password"
    );
    assert_eq!(descriptors[1].id, "second");
}

#[test]
fn scan_of_an_empty_page_returns_nothing() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    attach(&mut doc, root, text_node("h1", "No forms here"));

    assert!(scan(&doc, FillMode::OnlyEmpty).is_empty());
    assert!(scan(&doc, FillMode::AllEligible).is_empty());
}

#[test]
fn descriptors_carry_validation_and_kind_metadata() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let mut node = input("text", "zip", "zip");
    node.attrs.insert("required".to_string(), String::new());
    node.attrs
        .insert("pattern".to_string(), "[0-9]{5}".to_string());
    node.attrs.insert("minlength".to_string(), "5".to_string());
    node.attrs.insert("maxlength".to_string(), "10".to_string());
    node.attrs
        .insert("autocomplete".to_string(), "postal-code".to_string());
    node.attrs
        .insert("class".to_string(), "form-control wide".to_string());
    node.validation_message = Some("Please match the requested format.".to_string());
    attach(&mut doc, root, node);

    let descriptors = scan(&doc, FillMode::OnlyEmpty);
    let d = &descriptors[0];

    assert_eq!(d.kind, FieldKind::Text);
    assert!(d.required);
    assert_eq!(d.pattern.as_deref(), Some("[0-9]{5}"));
    assert_eq!(d.min_length, Some(5));
    assert_eq!(d.max_length, Some(10));
    assert_eq!(d.autocomplete, "postal-code");
    assert_eq!(d.css_classes, vec!["form-control", "wide"]);
    assert_eq!(
        d.validation_message.as_deref(),
        Some("Please match the requested format.")
    );
    assert!(d.options.is_empty(), "options only captured for selects");
}

#[test]
fn select_descriptors_list_trimmed_option_texts() {
    let page = signup_page();
    let descriptors = scan(&page.doc, FillMode::OnlyEmpty);

    let country = &descriptors[2];
    assert_eq!(country.kind, FieldKind::Select);
    assert_eq!(
        country.options,
        vec!["Select a country", "Canada", "United States"]
    );
}

#[test]
fn field_kind_derivation_covers_declared_types() {
    assert_eq!(FieldKind::from_declared("select", "select"), FieldKind::Select);
    assert_eq!(
        FieldKind::from_declared("textarea", "textarea"),
        FieldKind::TextArea
    );
    assert_eq!(FieldKind::from_declared("input", ""), FieldKind::Text);
    assert_eq!(FieldKind::from_declared("input", "email"), FieldKind::Email);
    assert_eq!(
        FieldKind::from_declared("input", "datetime-local"),
        FieldKind::Date
    );
    assert_eq!(
        FieldKind::from_declared("input", "color"),
        FieldKind::Other("color".to_string())
    );
    assert!(FieldKind::Select.is_enumerable());
    assert!(!FieldKind::TextArea.is_enumerable());
}

// ============================================================================
// Label inference
// ============================================================================

#[test]
fn explicit_for_label_is_found() {
    let page = signup_page();
    let labels = infer_labels(&page.doc, page.email);
    assert_eq!(labels, vec!["Email Address"]);
}

#[test]
fn enclosing_label_counts() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let label = attach(&mut doc, root, text_node("label", "Remember me"));
    let field = attach(&mut doc, label, input("checkbox", "remember", ""));

    assert_eq!(infer_labels(&doc, field), vec!["Remember me"]);
}

#[test]
fn aria_labelledby_resolves_each_reference_in_order() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let mut part1 = text_node("span", "Shipping");
    part1.attrs.insert("id".to_string(), "lbl-a".to_string());
    attach(&mut doc, root, part1);
    let mut part2 = text_node("span", "Address");
    part2.attrs.insert("id".to_string(), "lbl-b".to_string());
    attach(&mut doc, root, part2);

    let mut node = input("text", "addr", "addr");
    node.attrs
        .insert("aria-labelledby".to_string(), "lbl-a lbl-b".to_string());
    let field = attach(&mut doc, root, node);

    assert_eq!(infer_labels(&doc, field), vec!["Shipping", "Address"]);
}

#[test]
fn short_preceding_sibling_text_counts_long_text_does_not() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    attach(&mut doc, root, text_node("span", "Nickname"));
    let near = attach(&mut doc, root, input("text", "nick", ""));

    attach(&mut doc, root, text_node("div", &"x".repeat(300)));
    let after_wall = attach(&mut doc, root, input("text", "bio", ""));

    assert_eq!(infer_labels(&doc, near), vec!["Nickname"]);
    assert!(infer_labels(&doc, after_wall).is_empty());
}

#[test]
fn fieldset_legend_counts() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    let fieldset = attach(&mut doc, root, Node::new("fieldset"));
    attach(&mut doc, fieldset, text_node("legend", "Billing"));
    let field = attach(&mut doc, fieldset, input("text", "card", ""));

    assert_eq!(infer_labels(&doc, field), vec!["Billing"]);
}

#[test]
fn duplicate_label_text_is_reported_once() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    attach(&mut doc, root, label_for("email", "Email"));
    let mut node = input("email", "email", "email");
    node.attrs
        .insert("aria-labelledby".to_string(), "email-label".to_string());
    let field = attach(&mut doc, root, node);
    let mut dup = text_node("span", "Email");
    dup.attrs.insert("id".to_string(), "email-label".to_string());
    attach(&mut doc, root, dup);

    assert_eq!(infer_labels(&doc, field), vec!["Email"]);
}

// ============================================================================
// Page context
// ============================================================================

#[test]
fn page_context_captures_title_url_and_headings() {
    let page = signup_page();
    let context = PageContext::capture(&page.doc);

    assert_eq!(context.title, "Create Account");
    assert_eq!(context.url, "https://shop.example.com/signup");
    assert_eq!(context.meta_description, "Sign up for an account");
    assert_eq!(context.headings, "Create your account");
}
