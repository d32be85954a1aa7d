use serde::{Deserialize, Serialize};

use crate::error::FillError;

pub const DEFAULT_STORE_PATH: &str = "profile.json";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// ============================================================================
// Credential/profile store
// ============================================================================

/// The two opaque strings kept between sessions: the completion-service
/// credential and the free-text profile values are grounded in. The
/// core only ever distinguishes "present" from "absent".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileStore {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub user_data: String,
}

impl ProfileStore {
    /// Load from a JSON file. Missing or malformed files yield defaults;
    /// a fresh install has no store yet and that is not an error.
    pub fn load(path: &str) -> ProfileStore {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => ProfileStore::default(),
        }
    }

    pub fn save(&self, path: &str) -> Result<(), FillError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| FillError::StoreIo {
            path: path.to_string(),
            source: std::io::Error::other(e),
        })?;
        std::fs::write(path, &json).map_err(|e| FillError::StoreIo {
            path: path.to_string(),
            source: e,
        })
    }

    /// The credential actually used. The environment wins over the
    /// store so a key never has to land on disk.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        if self.api_key.trim().is_empty() {
            None
        } else {
            Some(self.api_key.clone())
        }
    }

    pub fn require_api_key(&self) -> Result<String, FillError> {
        self.resolve_api_key().ok_or(FillError::ConfigMissing)
    }
}
