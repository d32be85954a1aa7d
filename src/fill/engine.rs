use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::fill::applicator::apply_value;
use crate::fill::fill_model::{FillOutcome, FillStatus};
use crate::fill::resolver::resolve;
use crate::protocol::client::CompletionService;
use crate::protocol::completion_model::CompletionRequest;
use crate::scan::extractor::scan;
use crate::scan::field_model::{FieldDescriptor, FillMode, PageContext};
use crate::trace::{logger::TraceLogger, trace::TraceEvent};

// ============================================================================
// Fill engine: one trigger, one round trip, one apply pass
// ============================================================================

/// Drives the scan → request → resolve → apply pipeline for one
/// trigger. Every trigger surface (bulk command and per-field
/// affordance) funnels through here with an explicit mode.
pub struct FillEngine<'a> {
    service: &'a dyn CompletionService,
}

impl<'a> FillEngine<'a> {
    pub fn new(service: &'a dyn CompletionService) -> Self {
        Self { service }
    }

    /// Fill every eligible field on the document. With zero eligible
    /// fields this short-circuits before any request is issued.
    pub fn fill_document(
        &self,
        doc: &mut Document,
        profile: &str,
        mode: FillMode,
        now_ms: u64,
        tracer: &TraceLogger,
    ) -> FillOutcome {
        let descriptors = scan(doc, mode);
        tracer.log(&TraceEvent::now("scan").with_count(descriptors.len()));

        if descriptors.is_empty() {
            return FillOutcome::nothing_to_do();
        }

        self.run(doc, descriptors, profile, now_ms, tracer)
    }

    /// Fill one field, the scope a per-field affordance requests. The
    /// scan still covers the whole document so the descriptor keeps the
    /// index the bulk path would have given it; the request is then
    /// narrowed to the one descriptor sitting on the target node.
    pub fn fill_single(
        &self,
        doc: &mut Document,
        target: NodeId,
        profile: &str,
        mode: FillMode,
        now_ms: u64,
        tracer: &TraceLogger,
    ) -> FillOutcome {
        let descriptors = scan(doc, mode);
        tracer.log(&TraceEvent::now("scan").with_count(descriptors.len()));

        let narrowed: Vec<FieldDescriptor> = descriptors
            .into_iter()
            .filter(|d| d.node == target)
            .collect();

        if narrowed.is_empty() {
            return FillOutcome::nothing_to_do();
        }

        self.run(doc, narrowed, profile, now_ms, tracer)
    }

    fn run(
        &self,
        doc: &mut Document,
        descriptors: Vec<FieldDescriptor>,
        profile: &str,
        now_ms: u64,
        tracer: &TraceLogger,
    ) -> FillOutcome {
        let request = CompletionRequest {
            context: PageContext::capture(doc),
            profile: profile.to_string(),
            fields: descriptors,
        };
        tracer.log(&TraceEvent::now("request").with_count(request.fields.len()));

        // One attempt per trigger; any failure surfaces as-is, no retry.
        let values = match self.service.complete(&request) {
            Ok(values) => values,
            Err(err) => {
                tracer.log(&TraceEvent::now("response").with_detail(&err));
                return FillOutcome::failure(&err);
            }
        };
        tracer.log(&TraceEvent::now("response").with_count(values.len()));

        let mut filled = 0;
        let mut skipped = 0;
        let mut misses = 0;
        let mut failed = 0;

        // Iterate the descriptors we sent, never the reply's keys, so an
        // index the service invented has nothing to land on.
        for descriptor in &request.fields {
            let value = match values.get(descriptor.index) {
                Some(value) => value,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            // An unresolved field is skipped, never fatal to the batch.
            let (node, strategy) = match resolve(doc, descriptor) {
                Some(resolution) => resolution,
                None => {
                    misses += 1;
                    tracer.log(
                        &TraceEvent::now("resolve")
                            .with_field(descriptor.index)
                            .with_detail("no live match"),
                    );
                    continue;
                }
            };

            let outcome = apply_value(doc, node, value, now_ms);
            tracer.log(
                &TraceEvent::now("apply")
                    .with_field(descriptor.index)
                    .with_strategy(strategy.as_str())
                    .with_detail(outcome.as_str()),
            );

            if outcome.is_applied() {
                filled += 1;
            } else {
                failed += 1;
            }
        }

        FillOutcome {
            status: FillStatus::Filled,
            filled,
            skipped,
            misses,
            failed,
            detail: "Empty fields filled successfully!".to_string(),
        }
    }
}
