use crate::fill::fill_model::FillOutcome;
use crate::scenario::scenario_model::AssertionResult;

/// Execution state threaded through a scenario run: the logical clock,
/// the most recent trigger outcome, and every assertion evaluated so
/// far.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Current step index (0-based)
    pub current_step: usize,

    /// Logical clock in milliseconds; only `advance_time` moves it
    pub clock_ms: u64,

    /// Outcome of the most recent fill trigger, if any
    pub last_outcome: Option<FillOutcome>,

    /// All assertion results collected during execution
    pub assertion_results: Vec<AssertionResult>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        ScenarioContext {
            current_step: 0,
            clock_ms: 0,
            last_outcome: None,
            assertion_results: Vec::new(),
        }
    }

    /// Record assertion results from a step.
    pub fn record_assertions(&mut self, results: Vec<AssertionResult>) {
        self.assertion_results.extend(results);
    }

    /// Check if all recorded assertions passed.
    pub fn all_passed(&self) -> bool {
        self.assertion_results.iter().all(|r| r.passed)
    }

    /// Count of passing assertions.
    pub fn pass_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| r.passed).count()
    }

    /// Count of failing assertions.
    pub fn fail_count(&self) -> usize {
        self.assertion_results.iter().filter(|r| !r.passed).count()
    }

    /// Total number of assertions evaluated.
    pub fn total_count(&self) -> usize {
        self.assertion_results.len()
    }
}

impl Default for ScenarioContext {
    fn default() -> Self {
        Self::new()
    }
}
