use crate::dom::document::Document;
use crate::dom::node::{Node, NodeId};
use crate::fill::engine::FillEngine;
use crate::fill::fill_model::FillOutcome;
use crate::overlay::overlay_model::{
    Affordance, AffordanceState, GROUP_ATTR, LOADING_CLASS, OverlayStats, SYNC_DEBOUNCE_MS,
    TRIGGER_ATTR, TRIGGER_CLASS, field_fingerprint,
};
use crate::scan::extractor::is_eligible;
use crate::scan::field_model::FillMode;
use crate::trace::{logger::TraceLogger, trace::TraceEvent};

// ============================================================================
// Overlay lifecycle
// ============================================================================

/// Keeps one trigger affordance next to every eligible field, and keeps
/// that set consistent while the document mutates underneath it.
///
/// Mutation handling is deliberately coarse: the observer only looks at
/// subtree insertions and removals, and a qualifying batch arms a
/// single-slot debounce timer instead of synchronizing immediately.
/// Each later qualifying batch resets the slot; only the final deadline
/// fires a pass. Per-mutation synchronization produces pathological
/// affordance churn under rapid re-renders, which is the whole reason
/// this manager exists.
pub struct OverlayManager {
    mode: FillMode,
    affordances: Vec<Affordance>,
    pending_sync_at: Option<u64>,
    /// Reentrancy guard. A sync request arriving while a pass runs is
    /// dropped, not queued; the next qualifying mutation will arm the
    /// next pass.
    synchronizing: bool,
    stats: OverlayStats,
}

impl OverlayManager {
    pub fn new(mode: FillMode) -> Self {
        Self {
            mode,
            affordances: Vec::new(),
            pending_sync_at: None,
            synchronizing: false,
            stats: OverlayStats::default(),
        }
    }

    pub fn mode(&self) -> FillMode {
        self.mode
    }

    pub fn stats(&self) -> OverlayStats {
        self.stats
    }

    pub fn affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    pub fn affordance_count(&self) -> usize {
        self.affordances.len()
    }

    pub fn affordance_for(&self, field: NodeId) -> Option<&Affordance> {
        self.affordances.iter().find(|a| a.field == field)
    }

    pub fn sync_pending(&self) -> bool {
        self.pending_sync_at.is_some()
    }

    /// First installation on a freshly loaded document: one immediate
    /// pass, no debounce.
    pub fn install(&mut self, doc: &mut Document, now_ms: u64, tracer: &TraceLogger) {
        self.request_sync(doc, now_ms, tracer);
    }

    /// Drain the document's mutation journal. A batch qualifies when any
    /// added or removed node is a field or holds one; qualifying batches
    /// reset the debounce deadline. Affordance buttons are not fields,
    /// so a pass's own insertions and removals never re-arm the timer.
    pub fn observe(&mut self, doc: &mut Document, now_ms: u64) {
        let records = doc.take_mutations();
        let qualifying = records.iter().any(|record| {
            record
                .added
                .iter()
                .chain(record.removed.iter())
                .any(|&node| doc.contains_field(node))
        });
        if qualifying {
            self.pending_sync_at = Some(now_ms + SYNC_DEBOUNCE_MS);
        }
    }

    /// Clock tick: pick up fresh mutations, fire a due synchronization,
    /// expire confirmation highlights.
    pub fn pump(&mut self, doc: &mut Document, now_ms: u64, tracer: &TraceLogger) {
        self.observe(doc, now_ms);

        if let Some(deadline) = self.pending_sync_at {
            if now_ms >= deadline {
                self.pending_sync_at = None;
                self.request_sync(doc, now_ms, tracer);
            }
        }

        doc.clear_expired_highlights(now_ms);
    }

    /// Run a synchronization pass unless one is already running. Returns
    /// whether the pass ran.
    pub fn request_sync(&mut self, doc: &mut Document, now_ms: u64, tracer: &TraceLogger) -> bool {
        if self.synchronizing {
            self.stats.requests_dropped += 1;
            tracer.log(&TraceEvent::now("sync").with_detail("dropped mid-pass"));
            return false;
        }

        self.synchronizing = true;
        self.run_sync_pass(doc, now_ms, tracer);
        self.synchronizing = false;
        true
    }

    /// Full teardown before any rebuild, so affordances can never
    /// duplicate across back-to-back mutation bursts.
    fn run_sync_pass(&mut self, doc: &mut Document, _now_ms: u64, tracer: &TraceLogger) {
        self.stats.passes_run += 1;

        // 1) Remove every current affordance, tracked or orphaned.
        let stale: Vec<NodeId> = doc
            .preorder()
            .into_iter()
            .filter(|&id| doc.node(id).attr(TRIGGER_ATTR).is_some())
            .collect();
        for button in stale {
            doc.detach(button);
        }
        self.affordances.clear();

        // 2) Drop grouping markers from containers whose field departed.
        let stale_groups: Vec<NodeId> = doc
            .preorder()
            .into_iter()
            .filter(|&id| doc.node(id).attr(GROUP_ATTR).is_some() && !doc.contains_field(id))
            .collect();
        for container in stale_groups {
            doc.remove_attr(container, GROUP_ATTR);
        }

        // 3) Recreate one affordance per currently eligible field.
        for field in doc.fields() {
            if !is_eligible(doc, field, self.mode) {
                continue;
            }

            let fingerprint = field_fingerprint(doc, field);
            let mut button = Node::new("button");
            button.text = "Fill".to_string();
            let button = doc.create_node(button);
            doc.set_attr(button, TRIGGER_ATTR, &fingerprint);
            doc.set_attr(button, "class", TRIGGER_CLASS);
            doc.insert_after(field, button);

            if let Some(container) = doc.parent(field) {
                doc.set_attr(container, GROUP_ATTR, &fingerprint);
            }

            self.affordances.push(Affordance {
                field,
                button,
                fingerprint,
                state: AffordanceState::Idle,
            });
        }

        self.stats.affordances = self.affordances.len();
        tracer.log(&TraceEvent::now("sync").with_count(self.affordances.len()));
    }

    // ------------------------------------------------------------------
    // Per-affordance trigger path
    // ------------------------------------------------------------------

    /// Click entry. Returns false when the click is ignored: no
    /// affordance on that field, or its round trip is still in flight.
    pub fn begin_trigger(&mut self, doc: &mut Document, field: NodeId) -> bool {
        let affordance = match self.affordances.iter_mut().find(|a| a.field == field) {
            Some(a) => a,
            None => return false,
        };
        if affordance.state == AffordanceState::Loading {
            return false;
        }
        affordance.state = AffordanceState::Loading;
        let button = affordance.button;
        doc.add_class(button, LOADING_CLASS);
        true
    }

    /// Round-trip completion, success or error alike. Idempotent when a
    /// sync pass rebuilt the affordance mid-flight.
    pub fn finish_trigger(&mut self, doc: &mut Document, field: NodeId) {
        if let Some(affordance) = self.affordances.iter_mut().find(|a| a.field == field) {
            affordance.state = AffordanceState::Idle;
            let button = affordance.button;
            doc.remove_class(button, LOADING_CLASS);
        }
    }

    /// The composed click path: guard, single-field fill, settle. None
    /// means the click was ignored.
    pub fn trigger(
        &mut self,
        doc: &mut Document,
        field: NodeId,
        engine: &FillEngine,
        profile: &str,
        now_ms: u64,
        tracer: &TraceLogger,
    ) -> Option<FillOutcome> {
        if !self.begin_trigger(doc, field) {
            return None;
        }
        let outcome = engine.fill_single(doc, field, profile, self.mode, now_ms, tracer);
        self.finish_trigger(doc, field);
        Some(outcome)
    }
}
