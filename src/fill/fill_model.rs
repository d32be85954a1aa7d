use serde::Serialize;

use crate::error::FillError;

// ============================================================================
// Fill outcome reporting
// ============================================================================

/// Machine-readable tag for how a trigger ended. The human-readable
/// status line lives in `FillOutcome::detail`; callers branching on
/// behavior use this instead of string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    /// Round trip succeeded and values were applied (possibly zero, if
    /// the service proposed none).
    Filled,
    /// No eligible fields; no request was issued.
    NothingToDo,
    /// No API key present.
    ConfigMissing,
    /// Service unreachable or non-success status.
    TransportFailed,
    /// Reply failed structured-shape validation.
    ResponseInvalid,
}

impl FillStatus {
    pub fn for_error(err: &FillError) -> FillStatus {
        match err {
            FillError::ConfigMissing => FillStatus::ConfigMissing,
            FillError::Transport { .. } => FillStatus::TransportFailed,
            FillError::ResponseFormat { .. } => FillStatus::ResponseInvalid,
            // I/O errors are caught before a trigger ever starts
            _ => FillStatus::TransportFailed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillStatus::Filled => "filled",
            FillStatus::NothingToDo => "nothing_to_do",
            FillStatus::ConfigMissing => "config_missing",
            FillStatus::TransportFailed => "transport_failed",
            FillStatus::ResponseInvalid => "response_invalid",
        }
    }
}

/// What one trigger did, with per-field counters. `skipped` counts
/// descriptors the service proposed no value for, `misses` counts
/// descriptors no resolver strategy could relocate, and `failed` counts
/// fields that could not be mutated once resolved.
#[derive(Debug, Clone, Serialize)]
pub struct FillOutcome {
    pub status: FillStatus,
    pub filled: usize,
    pub skipped: usize,
    pub misses: usize,
    pub failed: usize,
    /// Human-readable status line shown on the trigger surface.
    pub detail: String,
}

impl FillOutcome {
    pub fn nothing_to_do() -> FillOutcome {
        FillOutcome {
            status: FillStatus::NothingToDo,
            filled: 0,
            skipped: 0,
            misses: 0,
            failed: 0,
            detail: "No empty fields found on this page.".to_string(),
        }
    }

    pub fn failure(err: &FillError) -> FillOutcome {
        FillOutcome {
            status: FillStatus::for_error(err),
            filled: 0,
            skipped: 0,
            misses: 0,
            failed: 0,
            detail: format!("Error: {}", err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, FillStatus::Filled | FillStatus::NothingToDo)
    }
}
