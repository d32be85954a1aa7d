use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dom::snapshot::{DocumentSnapshot, NodeSnapshot};
use crate::error::FillError;
use crate::scan::field_model::FillMode;

/// A complete fill scenario: the document it starts from, scripted
/// steps driving triggers and mutations against it, and assertions on
/// the resulting state. Deserialized from YAML for review and replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// Document the scenario starts from
    pub document: DocumentSource,

    /// Free-text profile the completion values are grounded in
    #[serde(default)]
    pub profile: String,

    /// Default trigger mode for the whole scenario
    #[serde(default)]
    pub mode: FillMode,

    /// Ordered list of steps to execute
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn load(path: &str) -> Result<Scenario, FillError> {
        let content = std::fs::read_to_string(path).map_err(|e| FillError::ScenarioIo {
            path: path.to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| FillError::ScenarioParse {
            path: path.to_string(),
            source: e,
        })
    }
}

/// A scenario either embeds its starting document inline or points at a
/// snapshot file, so several scenarios can share one capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentSource {
    Path(String),
    Inline(DocumentSnapshot),
}

impl DocumentSource {
    pub fn snapshot(&self) -> Result<DocumentSnapshot, FillError> {
        match self {
            DocumentSource::Inline(snapshot) => Ok(snapshot.clone()),
            DocumentSource::Path(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| FillError::SnapshotIo {
                        path: path.to_string(),
                        source: e,
                    })?;
                serde_json::from_str(&content).map_err(|e| FillError::SnapshotParse {
                    context: path.to_string(),
                    source: e,
                })
            }
        }
    }
}

/// A single step in a scenario. Elements are referenced by their `id`
/// attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Trigger a bulk fill over the whole document. With `values`
    /// present the completion reply is scripted; otherwise the runner's
    /// service answers.
    Fill {
        #[serde(default)]
        mode: Option<FillMode>,
        #[serde(default)]
        values: Option<HashMap<String, String>>,
    },

    /// Click the affordance attached to one field
    ClickAffordance {
        field_id: String,
        #[serde(default)]
        values: Option<HashMap<String, String>>,
    },

    /// Detach an element (and its subtree) from the document
    RemoveElement { id: String },

    /// Insert a snapshot subtree under an existing element
    InsertField {
        parent_id: String,
        node: NodeSnapshot,
    },

    /// Advance the logical clock and let timers fire
    AdvanceTime { duration_ms: u64 },

    /// Run assertions against the current document and overlay state
    Assert { assertions: Vec<AssertionSpec> },
}

/// A single assertion to evaluate against the current state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssertionSpec {
    /// A field's current value exactly matches
    ValueEquals { id: String, expected: String },

    /// A select field's selected option text exactly matches
    SelectedOption { id: String, expected: String },

    /// The overlay holds exactly this many affordances
    AffordanceCount { expected: usize },

    /// A change notification of the given kind was emitted for a field
    EventEmitted { id: String, kind: String },

    /// The most recent trigger ended with this status tag
    StatusIs { expected: String },

    /// Count of currently eligible fields equals expected. Defaults to
    /// the scenario's mode when none is given.
    EligibleCount {
        expected: usize,
        #[serde(default)]
        mode: Option<FillMode>,
    },
}

/// Result of evaluating a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// Which step this assertion belongs to (0-indexed)
    pub step_index: usize,

    /// The assertion that was evaluated
    pub spec: AssertionSpec,

    /// Whether the assertion passed
    pub passed: bool,

    /// Actual value found (for debugging failed assertions)
    pub actual: Option<String>,

    /// Human-readable failure message
    pub message: Option<String>,
}

/// Result of running a complete scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Name of the scenario that was run
    pub scenario_name: String,

    /// Whether all steps and assertions passed
    pub passed: bool,

    /// Number of steps that were executed
    pub steps_run: usize,

    /// All assertion results collected during the run
    pub assertion_results: Vec<AssertionResult>,

    /// Error message if the run failed outright (not assertion failure)
    pub error: Option<String>,
}
