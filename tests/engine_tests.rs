use form_autofill::dom::document::Document;
use form_autofill::error::FillError;
use form_autofill::fill::engine::FillEngine;
use form_autofill::fill::fill_model::{FillOutcome, FillStatus};
use form_autofill::protocol::client::{HeuristicService, ScriptedService};
use form_autofill::trace::logger::TraceLogger;
use form_autofill::scan::field_model::FillMode;

mod common;
use common::{attach, input, signup_page};

const PROFILE: &str = "Jane Doe, jane@example.com, +1 555 0100, United States";

// ============================================================================
// Bulk fill
// ============================================================================

#[test]
fn a_page_without_eligible_fields_issues_no_request() {
    let mut doc = Document::new("test://page", "", "");
    let root = doc.root();
    attach(&mut doc, root, input("password", "pw", "pw"));
    let filled = attach(&mut doc, root, input("text", "done", "done"));
    doc.set_value(filled, "kept");

    let service = ScriptedService::from_pairs(&[("1", "never used")]);
    let tracer = TraceLogger::disabled();
    let outcome = FillEngine::new(&service).fill_document(
        &mut doc,
        PROFILE,
        FillMode::OnlyEmpty,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::NothingToDo);
    assert_eq!(outcome.detail, "No empty fields found on this page.");
    assert_eq!(service.calls(), 0, "no round trip for an empty scan");
    assert_eq!(doc.node(filled).value, "kept");
}

#[test]
fn a_successful_round_trip_applies_every_proposed_value() {
    let mut page = signup_page();
    let service = ScriptedService::from_pairs(&[
        ("1", "jane@example.com"),
        ("2", "+1 555 0100"),
        ("3", "Canada"),
    ]);
    let tracer = TraceLogger::disabled();

    let outcome = FillEngine::new(&service).fill_document(
        &mut page.doc,
        PROFILE,
        FillMode::OnlyEmpty,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::Filled);
    assert_eq!(outcome.detail, "Empty fields filled successfully!");
    assert_eq!(outcome.filled, 3);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(outcome.misses, 0);
    assert_eq!(outcome.failed, 0);

    assert_eq!(page.doc.node(page.email).value, "jane@example.com");
    assert_eq!(page.doc.node(page.phone).value, "+1 555 0100");
    assert_eq!(
        page.doc.selected_option(page.country).map(|o| o.text.as_str()),
        Some("Canada")
    );
}

#[test]
fn indices_the_service_invented_have_nowhere_to_land() {
    let mut page = signup_page();
    let service = ScriptedService::from_pairs(&[("1", "jane@example.com"), ("99", "stray")]);
    let tracer = TraceLogger::disabled();

    let outcome = FillEngine::new(&service).fill_document(
        &mut page.doc,
        PROFILE,
        FillMode::OnlyEmpty,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::Filled);
    assert_eq!(outcome.filled, 1);
    assert_eq!(outcome.skipped, 2, "phone and country got no value");
    assert_eq!(page.doc.node(page.phone).value, "");
}

#[test]
fn a_malformed_reply_fails_the_whole_trigger() {
    let mut page = signup_page();
    let service = ScriptedService::from_raw_content("certainly! here are your values");
    let tracer = TraceLogger::disabled();

    let outcome = FillEngine::new(&service).fill_document(
        &mut page.doc,
        PROFILE,
        FillMode::OnlyEmpty,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::ResponseInvalid);
    assert_eq!(outcome.filled, 0);
    assert!(outcome.detail.starts_with("Error: Invalid response format"));
    assert_eq!(page.doc.node(page.email).value, "", "no partial application");
}

#[test]
fn refilling_with_only_empty_is_idempotent() {
    let mut page = signup_page();
    let service = HeuristicService;
    let tracer = TraceLogger::disabled();
    let engine = FillEngine::new(&service);

    let first = engine.fill_document(&mut page.doc, PROFILE, FillMode::OnlyEmpty, 0, &tracer);
    assert_eq!(first.status, FillStatus::Filled);
    assert_eq!(first.filled, 3);
    let email_after_first = page.doc.node(page.email).value.clone();

    let second = engine.fill_document(&mut page.doc, PROFILE, FillMode::OnlyEmpty, 0, &tracer);
    assert_eq!(second.status, FillStatus::NothingToDo);
    assert_eq!(page.doc.node(page.email).value, email_after_first);
}

#[test]
fn all_eligible_mode_overwrites_prefilled_values() {
    let mut page = signup_page();
    page.doc.set_value(page.email, "old@example.com");
    let service = ScriptedService::from_pairs(&[("1", "new@example.com")]);
    let tracer = TraceLogger::disabled();

    let outcome = FillEngine::new(&service).fill_document(
        &mut page.doc,
        PROFILE,
        FillMode::AllEligible,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::Filled);
    assert_eq!(page.doc.node(page.email).value, "new@example.com");
}

// ============================================================================
// Single-field fill
// ============================================================================

#[test]
fn fill_single_keeps_the_bulk_scan_index() {
    let mut page = signup_page();
    // Phone is field #2 in the full scan; the narrowed request still
    // correlates under that index.
    let service = ScriptedService::from_pairs(&[("2", "+1 555 0100")]);
    let tracer = TraceLogger::disabled();

    let outcome = FillEngine::new(&service).fill_single(
        &mut page.doc,
        page.phone,
        PROFILE,
        FillMode::OnlyEmpty,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::Filled);
    assert_eq!(outcome.filled, 1);
    assert_eq!(page.doc.node(page.phone).value, "+1 555 0100");
    assert_eq!(page.doc.node(page.email).value, "", "other fields untouched");
}

#[test]
fn fill_single_on_an_ineligible_target_does_nothing() {
    let mut page = signup_page();
    page.doc.set_value(page.email, "set@example.com");
    let service = ScriptedService::from_pairs(&[("1", "x")]);
    let tracer = TraceLogger::disabled();

    let outcome = FillEngine::new(&service).fill_single(
        &mut page.doc,
        page.email,
        PROFILE,
        FillMode::OnlyEmpty,
        0,
        &tracer,
    );

    assert_eq!(outcome.status, FillStatus::NothingToDo);
    assert_eq!(service.calls(), 0);
    assert_eq!(page.doc.node(page.email).value, "set@example.com");
}

// ============================================================================
// Outcome mapping
// ============================================================================

#[test]
fn failure_outcomes_keep_the_error_status_and_detail() {
    let missing = FillOutcome::failure(&FillError::ConfigMissing);
    assert_eq!(missing.status, FillStatus::ConfigMissing);
    assert_eq!(missing.detail, "Error: No OpenAI API key saved.");
    assert!(!missing.is_success());

    let transport = FillOutcome::failure(&FillError::Transport {
        status: Some(429),
        body: "rate limited".to_string(),
    });
    assert_eq!(transport.status, FillStatus::TransportFailed);
    assert_eq!(transport.detail, "Error: OpenAI API error (429): rate limited");

    let unreachable = FillOutcome::failure(&FillError::Transport {
        status: None,
        body: "connection refused".to_string(),
    });
    assert_eq!(unreachable.status, FillStatus::TransportFailed);
    assert!(unreachable.detail.contains("unreachable"));
}

#[test]
fn success_statuses_cover_filled_and_nothing_to_do() {
    assert!(FillOutcome::nothing_to_do().is_success());
    assert_eq!(FillStatus::Filled.as_str(), "filled");
    assert_eq!(FillStatus::NothingToDo.as_str(), "nothing_to_do");
    assert_eq!(FillStatus::ResponseInvalid.as_str(), "response_invalid");
}
