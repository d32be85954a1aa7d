use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::scan::field_model::{FieldDescriptor, PageContext};

// ============================================================================
// Request/response models for the completion round trip
// ============================================================================

/// Everything one completion round trip carries: the ordered descriptor
/// list, the page context captured with it, and the free-form profile
/// text the values must be grounded in.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub fields: Vec<FieldDescriptor>,
    pub context: PageContext,
    pub profile: String,
}

/// Validated outcome of a round trip: descriptor index → proposed value.
/// An absent index means "do not fill".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionValues {
    values: BTreeMap<usize, String>,
}

impl CompletionValues {
    /// Build the map from raw entries: empty or whitespace-only values are
    /// dropped, non-numeric keys are ignored, and when an index repeats the
    /// last occurrence wins.
    pub fn from_entries(entries: Vec<FieldEntry>) -> CompletionValues {
        let mut values = BTreeMap::new();
        for entry in entries {
            if entry.value.trim().is_empty() {
                continue;
            }
            if let Ok(index) = entry.key.trim().parse::<usize>() {
                values.insert(index, entry.value);
            }
        }
        CompletionValues { values }
    }

    pub fn insert(&mut self, index: usize, value: String) {
        if !value.trim().is_empty() {
            self.values.insert(index, value);
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(&index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.values.iter().map(|(&k, v)| (k, v.as_str()))
    }
}

// ============================================================================
// Chat-completions wire types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaSpec,
}

#[derive(Debug, Serialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub schema: serde_json::Value,
    pub strict: bool,
}

/// The strict structured-output contract: one object with one array
/// property of `{key, value}` string pairs, nothing else permitted.
pub fn field_values_format() -> ResponseFormat {
    ResponseFormat {
        format_type: "json_schema".to_string(),
        json_schema: JsonSchemaSpec {
            name: "form_field_values".to_string(),
            strict: true,
            schema: json!({
                "type": "object",
                "properties": {
                    "fields": {
                        "type": "array",
                        "description": "Array of field entries containing field numbers and their corresponding values",
                        "items": {
                            "type": "object",
                            "properties": {
                                "key": {
                                    "type": "string",
                                    "description": "The field number as a string (e.g., '1', '2')"
                                },
                                "value": {
                                    "type": "string",
                                    "description": "The value to be filled into the form field"
                                }
                            },
                            "required": ["key", "value"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["fields"],
                "additionalProperties": false
            }),
        },
    }
}

/// Response envelope: only the first choice's message content matters.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ApiChoice {
    pub message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponseMessage {
    pub content: Option<String>,
}

/// The shape the message content must parse to.
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldValuesPayload {
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub key: String,
    pub value: String,
}
