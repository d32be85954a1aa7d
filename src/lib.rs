use crate::{
    dom::document::Document,
    error::FillError,
    fill::{engine::FillEngine, fill_model::FillOutcome},
    protocol::client::CompletionService,
    scan::field_model::FillMode,
    trace::logger::TraceLogger,
};

pub mod cli;
pub mod dom;
pub mod error;
pub mod fill;
pub mod overlay;
pub mod protocol;
pub mod report;
pub mod scan;
pub mod scenario;
pub mod store;
pub mod trace;

/// Fill a snapshot in one call: parse, scan, complete, apply.
///
/// Returns the mutated document together with the run outcome so callers
/// can inspect both the new field values and the status line.
pub fn fill_snapshot(
    json: &str,
    service: &dyn CompletionService,
    profile: &str,
    mode: FillMode,
) -> Result<(Document, FillOutcome), FillError> {
    let mut doc = Document::from_json(json)?;
    let tracer = TraceLogger::disabled();
    let engine = FillEngine::new(service);
    let outcome = engine.fill_document(&mut doc, profile, mode, 0, &tracer);
    Ok((doc, outcome))
}
