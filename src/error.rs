use std::fmt;

#[derive(Debug)]
pub enum FillError {
    /// No API key present in the store or environment
    ConfigMissing,

    /// Completion service unreachable or returned a non-success status.
    /// `body` carries the raw error payload verbatim; `status` is None for
    /// connection-level failures.
    Transport { status: Option<u16>, body: String },

    /// Completion response missing or failed to parse against the
    /// structured shape. Never partially used.
    ResponseFormat {
        context: String,
        source: Option<serde_json::Error>,
    },

    /// Document snapshot file could not be read
    SnapshotIo { path: String, source: std::io::Error },

    /// Document snapshot JSON failed to deserialize
    SnapshotParse {
        context: String,
        source: serde_json::Error,
    },

    /// Scenario file could not be read
    ScenarioIo { path: String, source: std::io::Error },

    /// Scenario YAML failed to deserialize
    ScenarioParse {
        path: String,
        source: serde_yaml::Error,
    },

    /// A scenario step referenced an element id the document does not have
    UnknownElement { id: String },

    /// Profile store file could not be written
    StoreIo { path: String, source: std::io::Error },
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::ConfigMissing => {
                write!(f, "No OpenAI API key saved.")
            }
            FillError::Transport { status: Some(code), body } => {
                write!(f, "OpenAI API error ({}): {}", code, body)
            }
            FillError::Transport { status: None, body } => {
                write!(f, "OpenAI API unreachable: {}", body)
            }
            FillError::ResponseFormat { context, source } => match source {
                Some(e) => write!(f, "Invalid response format ({}): {}", context, e),
                None => write!(f, "Invalid response format ({})", context),
            },
            FillError::SnapshotIo { path, source } => {
                write!(f, "Failed to read document snapshot '{}': {}", path, source)
            }
            FillError::SnapshotParse { context, source } => {
                write!(f, "Snapshot parse error ({}): {}", context, source)
            }
            FillError::ScenarioIo { path, source } => {
                write!(f, "Failed to read scenario '{}': {}", path, source)
            }
            FillError::ScenarioParse { path, source } => {
                write!(f, "Scenario parse error ({}): {}", path, source)
            }
            FillError::UnknownElement { id } => {
                write!(f, "No element with id '{}' in the document", id)
            }
            FillError::StoreIo { path, source } => {
                write!(f, "Failed to write profile store '{}': {}", path, source)
            }
        }
    }
}

impl std::error::Error for FillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FillError::ResponseFormat { source: Some(e), .. } => Some(e),
            FillError::SnapshotIo { source, .. } => Some(source),
            FillError::SnapshotParse { source, .. } => Some(source),
            FillError::ScenarioIo { source, .. } => Some(source),
            FillError::ScenarioParse { source, .. } => Some(source),
            FillError::StoreIo { source, .. } => Some(source),
            _ => None,
        }
    }
}
