use std::cell::Cell;
use std::time::Duration;

use crate::error::FillError;
use crate::protocol::completion_model::{
    ApiMessage, ApiRequest, ApiResponse, CompletionRequest, CompletionValues, FieldEntry,
    FieldValuesPayload, field_values_format,
};
use crate::scan::field_model::FieldDescriptor;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Seam between the fill engine and whatever produces values. The wire
/// client, the offline heuristic, and scripted test doubles all sit
/// behind this.
pub trait CompletionService {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionValues, FillError>;
}

// ============================================================================
// Prompt construction
// ============================================================================

const SYSTEM_PROMPT: &str = "You are an expert at structured data extraction and form filling. Your task is to analyze form fields and provide appropriate values from user data.

Important rules:
1. Only fill fields where you have relevant information from the user data
2. Return empty string (\"\") for fields you shouldn't fill:
   - Password fields
   - Search boxes or search-related fields
   - Security questions
   - Verification codes
3. For select/dropdown fields, send a value that matches one of the available options
4. Make reasonable assumptions based on the context.
";

/// One prompt line per descriptor. Only populated attributes appear, so
/// the model never sees `pattern=` noise for fields without one.
pub fn field_line(field: &FieldDescriptor) -> String {
    let mut extras: Vec<String> = Vec::new();

    if !field.labels.is_empty() {
        extras.push(format!("labels: {}", field.labels.join(", ")));
    }
    if !field.aria_label.is_empty() {
        extras.push(format!("aria-label: {}", field.aria_label));
    }

    let mut validation: Vec<String> = Vec::new();
    if field.required {
        validation.push("required".to_string());
    }
    if let Some(pattern) = &field.pattern {
        validation.push(format!("pattern: {}", pattern));
    }
    if let Some(min) = field.min_length {
        validation.push(format!("minLength: {}", min));
    }
    if let Some(max) = field.max_length {
        validation.push(format!("maxLength: {}", max));
    }
    if let Some(message) = &field.validation_message {
        validation.push(format!("validation: {}", message));
    }
    if !validation.is_empty() {
        extras.push(validation.join(", "));
    }

    if !field.options.is_empty() {
        extras.push(format!("options: [{}]", field.options.join(", ")));
    }
    if !field.autocomplete.is_empty() {
        extras.push(format!("autocomplete: {}", field.autocomplete));
    }

    let mut line = format!(
        "Field #{}: type={}, name={}, id={}, placeholder={}",
        field.index,
        field.kind.as_wire_str(),
        field.name,
        field.id,
        field.placeholder,
    );
    for extra in extras {
        line.push(' ');
        line.push_str(&extra);
    }
    line
}

pub fn user_prompt(request: &CompletionRequest) -> String {
    let field_lines: Vec<String> = request.fields.iter().map(field_line).collect();

    format!(
        "Page Context:\n\
         Title: {}\n\
         URL: {}\n\
         Description: {}\n\
         Main Heading: {}\n\n\
         Here are the fields found on the page:\n{}\n\n\
         User data:\n-------\n{}\n--------\n\n\
         Please return a JSON with the following structure:\n\
         {{\n  \"fields\": [\n    {{\"key\": \"1\", \"value\": \"value_for_field_1\"}},\n    {{\"key\": \"2\", \"value\": \"value_for_field_2\"}},\n    ...\n  ]\n}}\n",
        request.context.title,
        request.context.url,
        request.context.meta_description,
        request.context.headings,
        field_lines.join("\n"),
        request.profile,
    )
}

pub fn build_api_request(model: &str, request: &CompletionRequest) -> ApiRequest {
    ApiRequest {
        model: model.to_string(),
        messages: vec![
            ApiMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ApiMessage {
                role: "user".to_string(),
                content: user_prompt(request),
            },
        ],
        temperature: 0.0,
        response_format: field_values_format(),
    }
}

// ============================================================================
// Reply validation
// ============================================================================

/// Parse a raw chat-completions reply body down to validated values.
/// Any shape violation rejects the whole reply; a malformed response is
/// never partially used.
pub fn parse_reply(body: &str) -> Result<CompletionValues, FillError> {
    let envelope: ApiResponse =
        serde_json::from_str(body).map_err(|e| FillError::ResponseFormat {
            context: "chat completion envelope".to_string(),
            source: Some(e),
        })?;

    let content = envelope
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .ok_or_else(|| FillError::ResponseFormat {
            context: "missing assistant content".to_string(),
            source: None,
        })?;

    parse_content(content)
}

/// Parse the assistant's message content against the declared shape.
pub fn parse_content(content: &str) -> Result<CompletionValues, FillError> {
    let payload: FieldValuesPayload =
        serde_json::from_str(content).map_err(|e| FillError::ResponseFormat {
            context: "field values payload".to_string(),
            source: Some(e),
        })?;
    Ok(CompletionValues::from_entries(payload.fields))
}

// ============================================================================
// OpenAI Backend
// ============================================================================

pub struct OpenAiService {
    pub endpoint: String,
    pub model: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl OpenAiService {
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_millis(REQUEST_TIMEOUT_MS),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

impl CompletionService for OpenAiService {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionValues, FillError> {
        let body = build_api_request(&self.model, request);

        let response = self
            .client
            .post(self.completions_url())
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .map_err(|e| FillError::Transport {
                status: None,
                body: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| FillError::Transport {
            status: Some(status.as_u16()),
            body: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FillError::Transport {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        parse_reply(&text)
    }
}

// ============================================================================
// Heuristic Backend (offline, no network)
// ============================================================================

pub struct HeuristicService;

/// Derive a plausible value from a field's surrounding text and kind.
/// Returns None when nothing matches; an unrecognized field stays empty
/// rather than getting junk.
pub fn guess_value(field: &FieldDescriptor) -> Option<String> {
    let haystack = [
        field.labels.join(" "),
        field.aria_label.clone(),
        field.placeholder.clone(),
        field.name.clone(),
        field.id.clone(),
        field.autocomplete.clone(),
    ]
    .join(" ")
    .to_lowercase();

    // Label-based heuristics (checked in order)
    let guessed = if haystack.contains("email") {
        Some("user@example.com")
    } else if haystack.contains("phone") || haystack.contains("tel") {
        Some("555-0100")
    } else if haystack.contains("url") || haystack.contains("website") {
        Some("https://example.com")
    } else if haystack.contains("zip") || haystack.contains("postal") {
        Some("90210")
    } else if haystack.contains("country") {
        Some("United States")
    } else if haystack.contains("city") {
        Some("Springfield")
    } else if haystack.contains("username") || haystack.contains("user") {
        Some("testuser")
    } else if haystack.contains("first") && haystack.contains("name") {
        Some("Jane")
    } else if haystack.contains("last") && haystack.contains("name") {
        Some("Doe")
    } else if haystack.contains("name") {
        Some("Jane Doe")
    } else if haystack.contains("date") || haystack.contains("birth") {
        Some("2025-01-15")
    } else if haystack.contains("number") || haystack.contains("amount") || haystack.contains("quantity") {
        Some("42")
    } else {
        None
    };

    if field.kind.is_enumerable() {
        // Only answer with one of the option texts
        let guess = guessed?.to_lowercase();
        return field
            .options
            .iter()
            .find(|text| {
                let t = text.to_lowercase();
                t.contains(&guess) || guess.contains(t.as_str())
            })
            .cloned();
    }

    if let Some(value) = guessed {
        return Some(value.to_string());
    }

    // Fall back to the declared kind
    match field.kind.as_wire_str() {
        "email" => Some("user@example.com".to_string()),
        "tel" => Some("555-0100".to_string()),
        "url" => Some("https://example.com".to_string()),
        "number" => Some("42".to_string()),
        "date" => Some("2025-01-15".to_string()),
        _ => None,
    }
}

impl CompletionService for HeuristicService {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionValues, FillError> {
        let mut values = CompletionValues::default();
        for field in &request.fields {
            if let Some(value) = guess_value(field) {
                values.insert(field.index, value);
            }
        }
        Ok(values)
    }
}

// ============================================================================
// Scripted Backend (fixed replies for scenarios and tests)
// ============================================================================

/// Replays a fixed entry list through the same validation path the wire
/// client uses, and counts how many times it was asked.
pub struct ScriptedService {
    entries: Vec<FieldEntry>,
    error: Option<String>,
    calls: Cell<usize>,
}

impl ScriptedService {
    pub fn new(entries: Vec<FieldEntry>) -> Self {
        Self {
            entries,
            error: None,
            calls: Cell::new(0),
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(key, value)| FieldEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        )
    }

    /// Replay a raw content string instead of well-formed entries, for
    /// exercising the malformed-reply path.
    pub fn from_raw_content(content: &str) -> Self {
        Self {
            entries: Vec::new(),
            error: Some(content.to_string()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl CompletionService for ScriptedService {
    fn complete(&self, _request: &CompletionRequest) -> Result<CompletionValues, FillError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(raw) = &self.error {
            return parse_content(raw);
        }
        Ok(CompletionValues::from_entries(self.entries.clone()))
    }
}
