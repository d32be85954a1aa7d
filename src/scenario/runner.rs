use std::collections::HashMap;

use crate::dom::document::Document;
use crate::dom::node::{EventKind, NodeId};
use crate::error::FillError;
use crate::fill::engine::FillEngine;
use crate::overlay::manager::OverlayManager;
use crate::protocol::client::{CompletionService, ScriptedService};
use crate::protocol::completion_model::FieldEntry;
use crate::scan::extractor::eligible_fields;
use crate::scan::field_model::FillMode;
use crate::scenario::context::ScenarioContext;
use crate::scenario::scenario_model::{
    AssertionResult, AssertionSpec, Scenario, ScenarioResult, ScenarioStep,
};
use crate::trace::logger::TraceLogger;

/// Executes a Scenario step-by-step against an in-memory document with
/// a live overlay manager.
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Run a complete scenario. `service` answers any fill step that
    /// does not script its own reply.
    ///
    /// Returns a ScenarioResult with pass/fail status, assertion
    /// results, and any error that occurred during execution.
    pub fn run(
        scenario: &Scenario,
        service: &dyn CompletionService,
        tracer: &TraceLogger,
    ) -> ScenarioResult {
        let snapshot = match scenario.document.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return ScenarioResult {
                    scenario_name: scenario.name.clone(),
                    passed: false,
                    steps_run: 0,
                    assertion_results: Vec::new(),
                    error: Some(format!("Failed to load document: {}", e)),
                };
            }
        };

        let mut state = RunState {
            doc: Document::from_snapshot(&snapshot),
            manager: OverlayManager::new(scenario.mode),
            ctx: ScenarioContext::new(),
            profile: &scenario.profile,
            default_mode: scenario.mode,
            service,
            tracer,
        };

        state
            .manager
            .install(&mut state.doc, state.ctx.clock_ms, tracer);

        for (i, step) in scenario.steps.iter().enumerate() {
            state.ctx.current_step = i;

            match state.execute_step(step, i) {
                Ok(()) => {}
                Err(e) => {
                    return ScenarioResult {
                        scenario_name: scenario.name.clone(),
                        passed: false,
                        steps_run: i + 1,
                        assertion_results: state.ctx.assertion_results,
                        error: Some(format!("Step {} failed: {}", i, e)),
                    };
                }
            }

            // The host delivers mutation callbacks between steps.
            let now = state.ctx.clock_ms;
            state.manager.observe(&mut state.doc, now);
        }

        let passed = state.ctx.all_passed();
        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed,
            steps_run: scenario.steps.len(),
            assertion_results: state.ctx.assertion_results,
            error: None,
        }
    }
}

/// Everything one running scenario owns.
struct RunState<'a> {
    doc: Document,
    manager: OverlayManager,
    ctx: ScenarioContext,
    profile: &'a str,
    default_mode: FillMode,
    service: &'a dyn CompletionService,
    tracer: &'a TraceLogger,
}

impl RunState<'_> {
    fn execute_step(&mut self, step: &ScenarioStep, step_index: usize) -> Result<(), FillError> {
        match step {
            ScenarioStep::Fill { mode, values } => {
                let mode = mode.unwrap_or(self.default_mode);
                let outcome = match values {
                    Some(map) => {
                        let scripted = ScriptedService::new(entries_from(map));
                        FillEngine::new(&scripted).fill_document(
                            &mut self.doc,
                            self.profile,
                            mode,
                            self.ctx.clock_ms,
                            self.tracer,
                        )
                    }
                    None => FillEngine::new(self.service).fill_document(
                        &mut self.doc,
                        self.profile,
                        mode,
                        self.ctx.clock_ms,
                        self.tracer,
                    ),
                };
                self.ctx.last_outcome = Some(outcome);
                Ok(())
            }

            ScenarioStep::ClickAffordance { field_id, values } => {
                let field = self.find_element(field_id)?;
                let outcome = match values {
                    Some(map) => {
                        let scripted = ScriptedService::new(entries_from(map));
                        let engine = FillEngine::new(&scripted);
                        self.manager.trigger(
                            &mut self.doc,
                            field,
                            &engine,
                            self.profile,
                            self.ctx.clock_ms,
                            self.tracer,
                        )
                    }
                    None => {
                        let engine = FillEngine::new(self.service);
                        self.manager.trigger(
                            &mut self.doc,
                            field,
                            &engine,
                            self.profile,
                            self.ctx.clock_ms,
                            self.tracer,
                        )
                    }
                };
                // An ignored click (no affordance, or still loading)
                // leaves the previous outcome in place.
                if let Some(outcome) = outcome {
                    self.ctx.last_outcome = Some(outcome);
                }
                Ok(())
            }

            ScenarioStep::RemoveElement { id } => {
                let node = self.find_element(id)?;
                self.doc.detach(node);
                Ok(())
            }

            ScenarioStep::InsertField { parent_id, node } => {
                let parent = self.find_element(parent_id)?;
                self.doc.insert_snapshot(parent, node);
                Ok(())
            }

            ScenarioStep::AdvanceTime { duration_ms } => {
                self.ctx.clock_ms += duration_ms;
                let now = self.ctx.clock_ms;
                self.manager.pump(&mut self.doc, now, self.tracer);
                Ok(())
            }

            ScenarioStep::Assert { assertions } => {
                let results = self.evaluate_assertions(assertions, step_index);
                self.ctx.record_assertions(results);
                Ok(())
            }
        }
    }

    fn find_element(&self, id: &str) -> Result<NodeId, FillError> {
        self.doc
            .find_by_id(id)
            .first()
            .copied()
            .ok_or_else(|| FillError::UnknownElement { id: id.to_string() })
    }

    fn evaluate_assertions(
        &self,
        assertions: &[AssertionSpec],
        step_index: usize,
    ) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|spec| self.evaluate_one(spec, step_index))
            .collect()
    }

    fn evaluate_one(&self, spec: &AssertionSpec, step_index: usize) -> AssertionResult {
        match spec {
            AssertionSpec::ValueEquals { id, expected } => match self.doc.find_by_id(id).first() {
                Some(&node) => {
                    let actual = self.doc.node(node).current_value().to_string();
                    let passed = actual == *expected;
                    result(
                        spec,
                        step_index,
                        passed,
                        Some(actual),
                        format!("Field '{}' value does not equal '{}'", id, expected),
                    )
                }
                None => missing_element(spec, step_index, id),
            },

            AssertionSpec::SelectedOption { id, expected } => {
                match self.doc.find_by_id(id).first() {
                    Some(&node) => {
                        let actual = self
                            .doc
                            .selected_option(node)
                            .map(|option| option.text.clone());
                        let passed = actual.as_deref() == Some(expected.as_str());
                        result(
                            spec,
                            step_index,
                            passed,
                            actual,
                            format!("Select '{}' does not have '{}' selected", id, expected),
                        )
                    }
                    None => missing_element(spec, step_index, id),
                }
            }

            AssertionSpec::AffordanceCount { expected } => {
                let actual = self.manager.affordance_count();
                result(
                    spec,
                    step_index,
                    actual == *expected,
                    Some(actual.to_string()),
                    format!("Affordance count is {} but expected {}", actual, expected),
                )
            }

            AssertionSpec::EventEmitted { id, kind } => {
                let wanted = match kind.as_str() {
                    "input" => EventKind::Input,
                    "change" => EventKind::Change,
                    other => {
                        return result(
                            spec,
                            step_index,
                            false,
                            None,
                            format!("Unknown event kind '{}'", other),
                        );
                    }
                };
                match self.doc.find_by_id(id).first() {
                    Some(&node) => {
                        let passed = self
                            .doc
                            .events()
                            .iter()
                            .any(|event| event.node == node && event.kind == wanted);
                        result(
                            spec,
                            step_index,
                            passed,
                            None,
                            format!("No '{}' event emitted for '{}'", kind, id),
                        )
                    }
                    None => missing_element(spec, step_index, id),
                }
            }

            AssertionSpec::StatusIs { expected } => {
                let actual = self
                    .ctx
                    .last_outcome
                    .as_ref()
                    .map(|outcome| outcome.status.as_str().to_string());
                let passed = actual.as_deref() == Some(expected.as_str());
                result(
                    spec,
                    step_index,
                    passed,
                    actual,
                    format!("Last trigger status is not '{}'", expected),
                )
            }

            AssertionSpec::EligibleCount { expected, mode } => {
                let mode = mode.unwrap_or(self.default_mode);
                let actual = eligible_fields(&self.doc, mode).len();
                result(
                    spec,
                    step_index,
                    actual == *expected,
                    Some(actual.to_string()),
                    format!("Eligible count is {} but expected {}", actual, expected),
                )
            }
        }
    }
}

fn entries_from(map: &HashMap<String, String>) -> Vec<FieldEntry> {
    map.iter()
        .map(|(key, value)| FieldEntry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn result(
    spec: &AssertionSpec,
    step_index: usize,
    passed: bool,
    actual: Option<String>,
    failure_message: String,
) -> AssertionResult {
    AssertionResult {
        step_index,
        spec: spec.clone(),
        passed,
        actual,
        message: if passed { None } else { Some(failure_message) },
    }
}

fn missing_element(spec: &AssertionSpec, step_index: usize, id: &str) -> AssertionResult {
    AssertionResult {
        step_index,
        spec: spec.clone(),
        passed: false,
        actual: None,
        message: Some(format!("Element '{}' not found on page", id)),
    }
}
